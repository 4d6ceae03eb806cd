//! Property tweening.
//!
//! A single [`Animator`] owns every active tween and is ticked once per
//! frame (the stage registers it at [`crate::invoker::PRIORITY_ANIMATION`]).
//! Targets expose named properties through [`AnimationTarget`]; starting a
//! tween captures the current value of each property and interpolates toward
//! the destination, numbers linearly and colors componentwise.
//!
//! Starting a tween on a `(target, property)` pair that is already animating
//! silently cancels the older tween for that pair: the last writer wins and
//! no abort callback fires for the displaced tween.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::easing::Easing;
use crate::error::SceneError;
use tela_surface::{Color, ColorDelta};

/// A tweenable property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Color(Color),
}

/// Named-property access for tween targets.
///
/// `get_property` returning `None` means the target has no such property;
/// the animator rejects the tween up front rather than animating garbage.
pub trait AnimationTarget {
    fn get_property(&self, name: &str) -> Option<PropertyValue>;
    fn set_property(&mut self, name: &str, value: PropertyValue);
}

pub type SharedTarget = Rc<RefCell<dyn AnimationTarget>>;

type Callback = Rc<dyn Fn()>;

/// Everything a tween needs besides its target. Cloneable so a finished
/// tween can be re-run via [`TweenHandle::repeat`].
#[derive(Clone, Default)]
pub struct TweenSpec {
    pub props: Vec<(String, PropertyValue)>,
    pub easing: Easing,
    pub duration_ms: f64,
    pub on_process: Option<Callback>,
    pub on_finish: Option<Callback>,
    pub on_abort: Option<Callback>,
}

impl TweenSpec {
    pub fn new() -> Self {
        Self {
            duration_ms: 500.0,
            ..Default::default()
        }
    }

    pub fn prop(mut self, name: impl Into<String>, value: f64) -> Self {
        self.props.push((name.into(), PropertyValue::Number(value)));
        self
    }

    pub fn color_prop(mut self, name: impl Into<String>, value: Color) -> Self {
        self.props.push((name.into(), PropertyValue::Color(value)));
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration_ms(mut self, ms: f64) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn on_process(mut self, f: impl Fn() + 'static) -> Self {
        self.on_process = Some(Rc::new(f));
        self
    }

    pub fn on_finish(mut self, f: impl Fn() + 'static) -> Self {
        self.on_finish = Some(Rc::new(f));
        self
    }

    pub fn on_abort(mut self, f: impl Fn() + 'static) -> Self {
        self.on_abort = Some(Rc::new(f));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

enum Delta {
    Number(f64),
    Color(ColorDelta),
}

struct Track {
    name: String,
    start: PropertyValue,
    delta: Delta,
}

impl Track {
    fn value_at(&self, factor: f64) -> PropertyValue {
        match (&self.start, &self.delta) {
            (PropertyValue::Number(s), Delta::Number(d)) => PropertyValue::Number(s + d * factor),
            (PropertyValue::Color(s), Delta::Color(d)) => PropertyValue::Color(s.shift(d, factor)),
            // Construction pairs start and delta kinds.
            _ => self.start,
        }
    }
}

enum Driver {
    Props {
        target: Weak<RefCell<dyn AnimationTarget>>,
        tracks: Vec<Track>,
    },
    /// Free-form interpolation: called with the eased factor each tick.
    Blend(Box<dyn FnMut(f64)>),
}

struct ActiveTween {
    id: TweenId,
    driver: Driver,
    easing: Easing,
    duration_ms: f64,
    elapsed_ms: f64,
    /// Marker key into the active-property map, for props drivers.
    target_key: Option<usize>,
    on_process: Option<Callback>,
    on_finish: Option<Callback>,
}

/// The tween manager. One per stage, ticked as a single scheduler task.
#[derive(Default)]
pub struct Animator {
    tweens: Vec<ActiveTween>,
    /// (target pointer, property name) → owning tween, for last-writer-wins.
    active_props: HashMap<(usize, String), TweenId>,
    /// Finish callbacks held back one pass so they observe final values.
    pending_finish: Vec<Callback>,
    next_id: u64,
}

pub type SharedAnimator = Rc<RefCell<Animator>>;

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    /// Start a property tween.
    ///
    /// A zero (or negative) duration applies the destination values and
    /// fires `on_finish` synchronously, bypassing the scheduler entirely.
    pub fn animate(
        animator: &SharedAnimator,
        target: &SharedTarget,
        spec: TweenSpec,
    ) -> Result<TweenHandle, SceneError> {
        if spec.props.is_empty() {
            return Err(SceneError::EmptyAnimation);
        }
        let key = Rc::as_ptr(target) as *const () as usize;

        let mut tracks = Vec::with_capacity(spec.props.len());
        {
            let t = target.borrow();
            for (name, dest) in &spec.props {
                let current = t
                    .get_property(name)
                    .ok_or_else(|| SceneError::UnknownProperty(name.clone()))?;
                let delta = match (current, dest) {
                    (PropertyValue::Number(from), PropertyValue::Number(to)) => {
                        Delta::Number(to - from)
                    }
                    (PropertyValue::Color(from), PropertyValue::Color(to)) => {
                        Delta::Color(from.diff(to))
                    }
                    _ => return Err(SceneError::PropertyTypeMismatch(name.clone())),
                };
                tracks.push(Track {
                    name: name.clone(),
                    start: current,
                    delta,
                });
            }
        }

        if spec.duration_ms <= 0.0 {
            // Immediate completion, no scheduler round-trip.
            {
                let mut t = target.borrow_mut();
                for (name, dest) in &spec.props {
                    t.set_property(name, *dest);
                }
            }
            if let Some(finish) = &spec.on_finish {
                finish();
            }
            return Ok(TweenHandle::finished(animator, target, spec));
        }

        let id = {
            let mut a = animator.borrow_mut();
            let id = TweenId(a.next_id);
            a.next_id += 1;
            for (name, _) in &spec.props {
                if let Some(old) = a.active_props.insert((key, name.clone()), id) {
                    // Displaced mid-flight: dropped without its abort callback.
                    // Its markers on other properties go too.
                    a.tweens.retain(|t| t.id != old);
                    a.active_props.retain(|_, owner| *owner != old);
                    debug!(?old, ?id, property = %name, "tween displaced");
                }
            }
            a.tweens.push(ActiveTween {
                id,
                driver: Driver::Props {
                    target: Rc::downgrade(target),
                    tracks,
                },
                easing: spec.easing.clone(),
                duration_ms: spec.duration_ms,
                elapsed_ms: 0.0,
                target_key: Some(key),
                on_process: spec.on_process.clone(),
                on_finish: spec.on_finish.clone(),
            });
            id
        };

        Ok(TweenHandle {
            id,
            animator: Rc::downgrade(animator),
            target: Some(Rc::downgrade(target)),
            spec,
            stopped: std::cell::Cell::new(false),
        })
    }

    /// Start a free-form tween: `blend` receives the eased factor each tick.
    /// Blend tweens have no property markers and cannot be repeated.
    pub fn animate_blend(
        animator: &SharedAnimator,
        blend: impl FnMut(f64) + 'static,
        spec: TweenSpec,
    ) -> TweenHandle {
        if spec.duration_ms <= 0.0 {
            let mut blend = blend;
            blend(1.0);
            if let Some(finish) = &spec.on_finish {
                finish();
            }
            return TweenHandle {
                id: TweenId(u64::MAX),
                animator: Rc::downgrade(animator),
                target: None,
                spec,
                stopped: std::cell::Cell::new(true),
            };
        }
        let mut a = animator.borrow_mut();
        let id = TweenId(a.next_id);
        a.next_id += 1;
        a.tweens.push(ActiveTween {
            id,
            driver: Driver::Blend(Box::new(blend)),
            easing: spec.easing.clone(),
            duration_ms: spec.duration_ms,
            elapsed_ms: 0.0,
            target_key: None,
            on_process: spec.on_process.clone(),
            on_finish: spec.on_finish.clone(),
        });
        drop(a);
        TweenHandle {
            id,
            animator: Rc::downgrade(animator),
            target: None,
            spec,
            stopped: std::cell::Cell::new(false),
        }
    }

    fn clear_markers(&mut self, id: TweenId, key: Option<usize>) {
        if key.is_some() {
            self.active_props.retain(|_, owner| *owner != id);
        }
    }

    /// Remove a tween. Returns its abort callback for the caller to fire
    /// once no animator borrow is held.
    fn stop(&mut self, id: TweenId, abort: Option<Callback>) -> Option<Callback> {
        let index = self.tweens.iter().position(|t| t.id == id)?;
        let tween = self.tweens.remove(index);
        self.clear_markers(id, tween.target_key);
        abort
    }

    /// Advance every tween by `elapsed_ms`. Returns the callbacks to fire
    /// after the borrow on the animator is released, in order: finish
    /// callbacks deferred from the previous pass, then this pass's process
    /// callbacks.
    pub fn tick(&mut self, elapsed_ms: f64) -> Vec<Callback> {
        let mut fire: Vec<Callback> = std::mem::take(&mut self.pending_finish);

        let mut deferred_finish: Vec<Callback> = Vec::new();
        let mut finished: Vec<(TweenId, Option<usize>)> = Vec::new();
        for tween in &mut self.tweens {
            tween.elapsed_ms = (tween.elapsed_ms + elapsed_ms).min(tween.duration_ms);
            let progress = tween.elapsed_ms / tween.duration_ms;
            let factor = tween.easing.factor(progress);

            let mut target_gone = false;
            match &mut tween.driver {
                Driver::Props { target, tracks } => match target.upgrade() {
                    Some(target) => {
                        let mut t = target.borrow_mut();
                        for track in tracks.iter() {
                            t.set_property(&track.name, track.value_at(factor));
                        }
                    }
                    None => target_gone = true,
                },
                Driver::Blend(blend) => blend(factor),
            }

            if target_gone {
                finished.push((tween.id, tween.target_key));
                continue;
            }
            if let Some(process) = &tween.on_process {
                fire.push(process.clone());
            }
            if progress >= 1.0 {
                if let Some(finish) = &tween.on_finish {
                    deferred_finish.push(finish.clone());
                }
                finished.push((tween.id, tween.target_key));
            }
        }

        self.pending_finish = deferred_finish;
        for (id, key) in finished {
            self.tweens.retain(|t| t.id != id);
            self.clear_markers(id, key);
        }
        fire
    }
}

/// Handle to a started tween: stop it early or re-run it after it finishes.
pub struct TweenHandle {
    id: TweenId,
    animator: Weak<RefCell<Animator>>,
    target: Option<Weak<RefCell<dyn AnimationTarget>>>,
    spec: TweenSpec,
    stopped: std::cell::Cell<bool>,
}

impl std::fmt::Debug for TweenHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenHandle")
            .field("id", &self.id)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl TweenHandle {
    fn finished(animator: &SharedAnimator, target: &SharedTarget, spec: TweenSpec) -> Self {
        Self {
            id: TweenId(u64::MAX),
            animator: Rc::downgrade(animator),
            target: Some(Rc::downgrade(target)),
            spec,
            stopped: std::cell::Cell::new(true),
        }
    }

    /// Cancel the tween, leaving properties at their current values.
    /// Fires `on_abort` if the tween was still active; repeated calls are
    /// no-ops.
    pub fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }
        let Some(animator) = self.animator.upgrade() else {
            return;
        };
        let abort = animator
            .borrow_mut()
            .stop(self.id, self.spec.on_abort.clone());
        if let Some(abort) = abort {
            abort();
        }
    }

    /// Re-run the same spec from the target's current state. `None` when
    /// the animator or target is gone, or for blend tweens.
    pub fn repeat(&self) -> Option<TweenHandle> {
        let animator = self.animator.upgrade()?;
        let target = self.target.as_ref()?.upgrade()?;
        Animator::animate(&animator, &target, self.spec.clone()).ok()
    }
}
