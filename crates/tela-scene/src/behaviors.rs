//! Interaction behaviors layered over the dispatch stream.
//!
//! The mouse router synthesizes [`Dispatch`] lists; these controllers
//! consume them and produce follow-up dispatches of their own (status
//! changes, drag lifecycle, drops). They hold strong references to the
//! concrete elements they manage, registered opt-in per element.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tela_geometry::Point;
use tracing::debug;

use crate::animation::{Animator, SharedAnimator, TweenHandle, TweenSpec};
use crate::easing::Easing;
use crate::element::{Drawable, ElementId, ShapeElement};
use crate::events::{Dispatch, ElementEvent, MouseEventKind};

pub type SharedElement = Rc<RefCell<ShapeElement>>;

/// Maintains the `hover`/`active` flags and reports changes.
#[derive(Default)]
pub struct Clickable {
    targets: HashMap<ElementId, SharedElement>,
}

impl Clickable {
    pub fn enable(&mut self, id: ElementId, element: SharedElement) {
        self.targets.insert(id, element);
    }

    pub fn disable(&mut self, id: ElementId) {
        self.targets.remove(&id);
    }

    /// Returns a `StatusChanged` dispatch per actual flag flip.
    pub fn apply(&self, dispatches: &[Dispatch]) -> Vec<Dispatch> {
        let mut out = Vec::new();
        for d in dispatches {
            let Some(element) = self.targets.get(&d.target) else {
                continue;
            };
            let mut e = element.borrow_mut();
            let changed = match &d.event {
                ElementEvent::MouseOver => {
                    e.hover = true;
                    true
                }
                ElementEvent::MouseOut | ElementEvent::LeftCanvas => {
                    std::mem::replace(&mut e.hover, false)
                }
                ElementEvent::Raw(MouseEventKind::Down) => {
                    e.active = true;
                    true
                }
                ElementEvent::Raw(MouseEventKind::Up)
                | ElementEvent::Away(MouseEventKind::Up) => {
                    std::mem::replace(&mut e.active, false)
                }
                _ => false,
            };
            if changed {
                out.push(Dispatch::new(d.target, ElementEvent::StatusChanged));
            }
        }
        out
    }
}

/// Pointer-capture dragging with incremental deltas.
///
/// A captured element follows the pointer even through `away:` moves (the
/// pointer outran the shape) and releases on up, away-up, or the pointer
/// leaving the canvas.
#[derive(Default)]
pub struct DragController {
    targets: HashMap<ElementId, SharedElement>,
    capture: HashMap<ElementId, Point>,
}

impl DragController {
    pub fn enable(&mut self, id: ElementId, element: SharedElement) {
        element.borrow_mut().draggable = true;
        self.targets.insert(id, element);
    }

    /// Clears the draggable flag; an in-flight capture is released quietly.
    pub fn disable(&mut self, id: ElementId) {
        if let Some(element) = self.targets.remove(&id) {
            element.borrow_mut().draggable = false;
        }
        self.capture.remove(&id);
    }

    pub fn is_dragging(&self, id: ElementId) -> bool {
        self.capture.contains_key(&id)
    }

    pub fn apply(&mut self, dispatches: &[Dispatch], pointer: Point) -> Vec<Dispatch> {
        let mut out = Vec::new();
        for d in dispatches {
            let Some(element) = self.targets.get(&d.target) else {
                continue;
            };
            // The flag can be flipped directly on the element; respect it.
            if !element.borrow().draggable {
                continue;
            }
            match &d.event {
                ElementEvent::Raw(MouseEventKind::Down) => {
                    self.capture.insert(d.target, pointer);
                    out.push(Dispatch::new(d.target, ElementEvent::StartDrag));
                    debug!(id = d.target, "drag start");
                }
                ElementEvent::Raw(MouseEventKind::Move)
                | ElementEvent::Away(MouseEventKind::Move) => {
                    if let Some(prev) = self.capture.get_mut(&d.target) {
                        let delta = prev.diff(pointer);
                        *prev = pointer;
                        element.borrow_mut().shape_mut().translate(delta);
                        out.push(Dispatch::new(d.target, ElementEvent::MoveDrag(delta)));
                    }
                }
                ElementEvent::Raw(MouseEventKind::Up)
                | ElementEvent::Away(MouseEventKind::Up)
                | ElementEvent::Away(MouseEventKind::Out)
                | ElementEvent::LeftCanvas => {
                    if self.capture.remove(&d.target).is_some() {
                        out.push(Dispatch::new(d.target, ElementEvent::StopDrag));
                        debug!(id = d.target, "drag stop");
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// Resolves drops when a registered draggable releases.
#[derive(Default)]
pub struct Droppable {
    zones: HashMap<ElementId, Vec<(ElementId, SharedElement)>>,
}

impl Droppable {
    /// Let `drag_id` be droppable onto `zone_id`.
    pub fn register(&mut self, drag_id: ElementId, zone_id: ElementId, zone: SharedElement) {
        self.zones.entry(drag_id).or_default().push((zone_id, zone));
    }

    /// Feed the drag controller's output; every `StopDrag` for a registered
    /// draggable yields a `Dropped` with the hit zone, or `None` when the
    /// release happened off every zone (or off the canvas).
    pub fn apply(
        &self,
        drag_dispatches: &[Dispatch],
        pointer: Point,
        in_canvas: bool,
    ) -> Vec<Dispatch> {
        let mut out = Vec::new();
        for d in drag_dispatches {
            if d.event != ElementEvent::StopDrag {
                continue;
            }
            let Some(zones) = self.zones.get(&d.target) else {
                continue;
            };
            let hit = if in_canvas {
                zones
                    .iter()
                    .find(|(_, zone)| zone.borrow().shape().contains(pointer))
                    .map(|(zone_id, _)| *zone_id)
            } else {
                None
            };
            out.push(Dispatch::new(d.target, ElementEvent::Dropped(hit)));
        }
        out
    }
}

/// Rigidly attaches follower elements to a leader's drag moves.
#[derive(Default)]
pub struct Linkable {
    links: HashMap<ElementId, Vec<SharedElement>>,
}

impl Linkable {
    pub fn link(&mut self, leader: ElementId, follower: SharedElement) {
        self.links.entry(leader).or_default().push(follower);
    }

    pub fn unlink_all(&mut self, leader: ElementId) {
        self.links.remove(&leader);
    }

    /// Mirror every `MoveDrag` delta onto the leader's followers.
    pub fn apply(&self, dispatches: &[Dispatch]) {
        for d in dispatches {
            let ElementEvent::MoveDrag(delta) = d.event else {
                continue;
            };
            if let Some(followers) = self.links.get(&d.target) {
                for follower in followers {
                    follower.borrow_mut().shape_mut().translate(delta);
                }
            }
        }
    }
}

/// Speed-based motion: moves an element toward a target at `speed` canvas
/// units per second through a blend tween.
#[derive(Default)]
pub struct Moveable {
    moving: HashMap<ElementId, TweenHandle>,
}

impl Moveable {
    /// Start moving. A move already in flight for the element is stopped
    /// first (firing its abort callback). Zero distance or a non-positive
    /// speed snaps immediately and returns `false`; `true` means a tween is
    /// running.
    pub fn move_to(
        &mut self,
        id: ElementId,
        element: &SharedElement,
        animator: &SharedAnimator,
        target: Point,
        speed: f64,
        easing: Easing,
        spec: TweenSpec,
    ) -> bool {
        if let Some(prev) = self.moving.remove(&id) {
            prev.stop();
        }
        let origin = element.borrow().shape().origin();
        let diff = origin.diff(target);
        let distance = diff.length();
        if speed <= 0.0 || distance == 0.0 {
            element.borrow_mut().shape_mut().translate(diff);
            if let Some(finish) = &spec.on_finish {
                finish();
            }
            return false;
        }
        let duration = distance / speed * 1000.0;
        let elem = element.clone();
        let mut applied = 0.0;
        let handle = Animator::animate_blend(
            animator,
            move |factor| {
                let step = diff * (factor - applied);
                applied = factor;
                elem.borrow_mut().shape_mut().translate(step);
            },
            spec.duration_ms(duration).easing(easing),
        );
        self.moving.insert(id, handle);
        true
    }

    /// Cancel an in-flight move, leaving the element where it is.
    pub fn stop(&mut self, id: ElementId) -> bool {
        match self.moving.remove(&id) {
            Some(handle) => {
                handle.stop();
                true
            }
            None => false,
        }
    }
}
