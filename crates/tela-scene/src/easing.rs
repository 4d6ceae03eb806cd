//! Named timing functions with an `in`/`out` token grammar.
//!
//! A timing function name is dash-separated tokens: base curve names plus
//! optional `in` / `out` markers. `"sine"` and `"sine-in"` evaluate the
//! curve directly, `"sine-out"` mirrors it, `"sine-in-out"` (or two bases,
//! `"quad-expo"`) blends the halves. Parametric curves take their extra
//! arguments through [`Easing::with_params`].

use crate::error::SceneError;

/// Back-curve default overshoot factor.
const BACK_X: f64 = 1.618;

/// One base curve, evaluated on `[0, 1]` in its accelerating ("in") form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    Pow,
    Quad,
    Cubic,
    Quart,
    Quint,
    Expo,
    Circ,
    Sine,
    Back,
    Bounce,
    Elastic,
}

impl Curve {
    fn from_name(name: &str) -> Option<Curve> {
        Some(match name {
            "linear" => Curve::Linear,
            "pow" => Curve::Pow,
            "quad" => Curve::Quad,
            "cubic" => Curve::Cubic,
            "quart" => Curve::Quart,
            "quint" => Curve::Quint,
            "expo" => Curve::Expo,
            "circ" => Curve::Circ,
            "sine" => Curve::Sine,
            "back" => Curve::Back,
            "bounce" => Curve::Bounce,
            "elastic" => Curve::Elastic,
            _ => return None,
        })
    }

    fn evaluate(self, p: f64, params: &[f64]) -> f64 {
        match self {
            Curve::Linear => p,
            Curve::Pow => p.powf(params.first().copied().unwrap_or(6.0)),
            Curve::Quad => p * p,
            Curve::Cubic => p * p * p,
            Curve::Quart => p * p * p * p,
            Curve::Quint => p * p * p * p * p,
            Curve::Expo => 2f64.powf(8.0 * (p - 1.0)),
            Curve::Circ => 1.0 - p.acos().sin(),
            Curve::Sine => 1.0 - ((1.0 - p) * std::f64::consts::PI / 2.0).sin(),
            Curve::Back => {
                let x = params.first().copied().unwrap_or(BACK_X);
                p * p * ((x + 1.0) * p - x)
            }
            Curve::Bounce => {
                // Successively halved bounce bands.
                let mut a = 0.0;
                let mut b = 1.0;
                loop {
                    if p >= (7.0 - 4.0 * a) / 11.0 {
                        break b * b - ((11.0 - 6.0 * a - 11.0 * p) / 4.0).powi(2);
                    }
                    a += b;
                    b /= 2.0;
                }
            }
            Curve::Elastic => {
                let x = params.first().copied().unwrap_or(1.0);
                let q = p - 1.0;
                2f64.powf(10.0 * q) * (20.0 * q * std::f64::consts::PI * x / 3.0).cos()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Direct evaluation.
    In,
    /// Mirrored: `1 - f(1 - p)`.
    Out,
    /// First curve drives the first half, the (mirrored) second curve the
    /// second half.
    InOut,
}

/// A parsed timing function.
#[derive(Debug, Clone, PartialEq)]
pub struct Easing {
    mode: Mode,
    first: Curve,
    second: Curve,
    params: Vec<f64>,
}

impl Easing {
    pub fn linear() -> Easing {
        Easing {
            mode: Mode::In,
            first: Curve::Linear,
            second: Curve::Linear,
            params: Vec::new(),
        }
    }

    /// Parse a dash-separated name. Unknown base tokens fail immediately so
    /// a typo never silently degrades to linear.
    pub fn parse(name: &str) -> Result<Easing, SceneError> {
        let mut has_in = false;
        let mut has_out = false;
        let mut bases = Vec::new();
        for token in name.split('-') {
            match token {
                "in" => has_in = true,
                "out" => has_out = true,
                other => match Curve::from_name(other) {
                    Some(curve) => bases.push(curve),
                    None => return Err(SceneError::UnknownTimingFunction(name.to_string())),
                },
            }
        }
        let Some(&first) = bases.first() else {
            return Err(SceneError::UnknownTimingFunction(name.to_string()));
        };
        let mode = if has_out && !has_in {
            Mode::Out
        } else if (has_in && has_out) || bases.len() > 1 {
            Mode::InOut
        } else {
            Mode::In
        };
        Ok(Easing {
            mode,
            first,
            second: bases.get(1).copied().unwrap_or(first),
            params: Vec::new(),
        })
    }

    /// Attach curve parameters (e.g. the `pow` exponent or `back` overshoot).
    pub fn with_params(mut self, params: Vec<f64>) -> Self {
        self.params = params;
        self
    }

    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn factor(&self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        match self.mode {
            Mode::In => self.first.evaluate(p, &self.params),
            Mode::Out => 1.0 - self.first.evaluate(1.0 - p, &self.params),
            Mode::InOut => {
                if p <= 0.5 {
                    self.first.evaluate(2.0 * p, &self.params) / 2.0
                } else {
                    (2.0 - self.second.evaluate(2.0 * (1.0 - p), &self.params)) / 2.0
                }
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::linear()
    }
}
