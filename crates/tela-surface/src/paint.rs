use std::fmt;

use tela_geometry::Point;
use thiserror::Error;

/// Errors from the color string parser.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaintError {
    #[error("unrecognized color `{0}`")]
    UnknownColor(String),
}

/// The 17 basic named colors accepted by [`Color::parse`].
const NAMED: &[(&str, [u8; 3])] = &[
    ("white", [0xff, 0xff, 0xff]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("gray", [0x80, 0x80, 0x80]),
    ("black", [0x00, 0x00, 0x00]),
    ("red", [0xff, 0x00, 0x00]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("olive", [0x80, 0x80, 0x00]),
    ("lime", [0x00, 0xff, 0x00]),
    ("green", [0x00, 0x80, 0x00]),
    ("aqua", [0x00, 0xff, 0xff]),
    ("teal", [0x00, 0x80, 0x80]),
    ("blue", [0x00, 0x00, 0xff]),
    ("navy", [0x00, 0x00, 0x80]),
    ("fuchsia", [0xff, 0x00, 0xff]),
    ("purple", [0x80, 0x00, 0x80]),
    ("orange", [0xff, 0xa5, 0x00]),
];

/// sRGB color with an optional alpha channel.
///
/// Alpha is `None` for colors written without one (`#rrggbb`, `rgb()`,
/// names); such colors serialize back in the `rgb()` form and stay
/// alpha-less through interpolation unless blended toward a color that
/// carries alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: Option<f32>,
}

/// Componentwise difference between two colors, produced by [`Color::diff`]
/// and consumed by [`Color::shift`] during interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDelta {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
    pub has_alpha: bool,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a: Some(a) }
    }

    /// Parse a named color, `#rgb`, `#rrggbb`, `rgb(...)` or `rgba(...)`.
    pub fn parse(text: &str) -> Result<Self, PaintError> {
        let s = text.trim().to_ascii_lowercase();
        let fail = || PaintError::UnknownColor(text.to_string());

        if let Some((_, rgb)) = NAMED.iter().find(|(name, _)| *name == s) {
            return Ok(Self::rgb(rgb[0], rgb[1], rgb[2]));
        }

        if let Some(hex) = s.strip_prefix('#') {
            let expand = |h: &str| u8::from_str_radix(h, 16).map_err(|_| fail());
            return match hex.len() {
                3 => {
                    let digit = |i: usize| {
                        let d = &hex[i..i + 1];
                        expand(&format!("{d}{d}"))
                    };
                    Ok(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
                }
                6 => Ok(Self::rgb(
                    expand(&hex[0..2])?,
                    expand(&hex[2..4])?,
                    expand(&hex[4..6])?,
                )),
                _ => Err(fail()),
            };
        }

        let func = |name: &str| -> Option<Vec<&str>> {
            s.strip_prefix(name)?
                .strip_prefix('(')?
                .strip_suffix(')')
                .map(|args| args.split(',').map(str::trim).collect())
        };
        if let Some(args) = func("rgba") {
            if let [r, g, b, a] = args.as_slice() {
                let chan = |v: &str| v.parse::<u8>().map_err(|_| fail());
                let alpha = a.parse::<f32>().map_err(|_| fail())?;
                return Ok(Self::rgba(chan(r)?, chan(g)?, chan(b)?, alpha));
            }
            return Err(fail());
        }
        if let Some(args) = func("rgb") {
            if let [r, g, b] = args.as_slice() {
                let chan = |v: &str| v.parse::<u8>().map_err(|_| fail());
                return Ok(Self::rgb(chan(r)?, chan(g)?, chan(b)?));
            }
            return Err(fail());
        }

        Err(fail())
    }

    /// Whether `text` parses as a color.
    pub fn is_color_string(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha with the alpha-less default of fully opaque.
    #[inline]
    pub fn alpha_or_opaque(&self) -> f32 {
        self.a.unwrap_or(1.0)
    }

    /// Componentwise delta from `self` toward `to`. The delta carries alpha
    /// when either endpoint does, treating a missing channel as opaque.
    pub fn diff(&self, to: &Color) -> ColorDelta {
        ColorDelta {
            r: to.r as f64 - self.r as f64,
            g: to.g as f64 - self.g as f64,
            b: to.b as f64 - self.b as f64,
            a: (to.alpha_or_opaque() - self.alpha_or_opaque()) as f64,
            has_alpha: self.a.is_some() || to.a.is_some(),
        }
    }

    /// Apply `factor` of `delta`, rounding channels and clamping into range.
    pub fn shift(&self, delta: &ColorDelta, factor: f64) -> Color {
        let chan = |base: u8, d: f64| (base as f64 + d * factor).round().clamp(0.0, 255.0) as u8;
        let a = if delta.has_alpha || self.a.is_some() {
            let base = self.alpha_or_opaque() as f64;
            Some((base + delta.a * factor).clamp(0.0, 1.0) as f32)
        } else {
            None
        };
        Color {
            r: chan(self.r, delta.r),
            g: chan(self.g, delta.g),
            b: chan(self.b, delta.b),
            a,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.a {
            Some(a) => write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, a),
            None => write!(f, "rgb({},{},{})", self.r, self.g, self.b),
        }
    }
}

impl std::str::FromStr for Color {
    type Err = PaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One stop of a gradient ramp. `offset` is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// Fill/stroke source: a solid color or a gradient ramp.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        from: Point,
        to: Point,
        stops: Vec<GradientStop>,
    },
    RadialGradient {
        center: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// The solid color, if this paint is one.
    pub fn as_solid(&self) -> Option<Color> {
        match self {
            Paint::Solid(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<Color> for Paint {
    fn from(c: Color) -> Self {
        Paint::Solid(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("lime"), Ok(Color::rgb(0, 255, 0)));
        assert_eq!(Color::parse("  Orange "), Ok(Color::rgb(255, 165, 0)));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#fff"), Ok(Color::rgb(255, 255, 255)));
        assert_eq!(Color::parse("#1a2b3c"), Ok(Color::rgb(0x1a, 0x2b, 0x3c)));
        assert_eq!(
            Color::parse("#12345"),
            Err(PaintError::UnknownColor("#12345".to_string()))
        );
    }

    #[test]
    fn test_parse_functional() {
        assert_eq!(Color::parse("rgb(1, 2, 3)"), Ok(Color::rgb(1, 2, 3)));
        assert_eq!(
            Color::parse("rgba(1,2,3,0.5)"),
            Ok(Color::rgba(1, 2, 3, 0.5))
        );
        assert!(Color::parse("rgb(1,2)").is_err());
        assert!(Color::parse("rgb(256,0,0)").is_err());
        assert!(!Color::is_color_string("chartreuse"));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "rgb(1,2,3)");
        assert_eq!(Color::rgba(1, 2, 3, 0.5).to_string(), "rgba(1,2,3,0.5)");
        assert_eq!(Color::rgb(255, 0, 128).to_hex(), "#ff0080");
    }

    #[test]
    fn test_shift_midpoint() {
        let black = Color::parse("#000000").unwrap();
        let white = Color::parse("#ffffff").unwrap();
        let d = black.diff(&white);
        let mid = black.shift(&d, 0.5);
        assert_eq!(mid.to_string(), "rgb(128,128,128)");
    }

    #[test]
    fn test_shift_clamps() {
        let c = Color::rgb(200, 10, 0);
        let d = ColorDelta {
            r: 200.0,
            g: -100.0,
            b: 0.0,
            a: 0.0,
            has_alpha: false,
        };
        let shifted = c.shift(&d, 1.0);
        assert_eq!((shifted.r, shifted.g, shifted.b), (255, 0, 0));
        assert_eq!(shifted.a, None);
    }

    #[test]
    fn test_shift_gains_alpha_from_delta() {
        let from = Color::rgb(0, 0, 0);
        let to = Color::rgba(0, 0, 0, 0.0);
        let d = from.diff(&to);
        assert!(d.has_alpha);
        let mid = from.shift(&d, 0.5);
        assert_eq!(mid.a, Some(0.5));
    }
}
