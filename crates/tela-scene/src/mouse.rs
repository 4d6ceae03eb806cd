use std::cell::Cell;
use std::rc::{Rc, Weak};

use tela_geometry::Point;
use tracing::trace;

use crate::element::{ElementId, SharedDrawable};
use crate::events::{Dispatch, ElementEvent, MouseEventKind};
use crate::input_state::{MouseButton, SharedInputState};

/// Wheel movement as delivered by the embedder, normalized by the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    /// Click-multiples of ±120, positive up.
    Multiples(f64),
    /// Line counts, positive down.
    Lines(f64),
}

impl WheelDelta {
    /// Normalize to wheel clicks, positive up.
    pub fn normalize(self) -> f64 {
        match self {
            WheelDelta::Multiples(v) => v / 120.0,
            WheelDelta::Lines(v) => -v / 3.0,
        }
    }
}

/// A raw pointer event from the embedder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub position: Option<Point>,
    pub button: Option<MouseButton>,
    pub wheel: Option<WheelDelta>,
}

impl MouseEvent {
    pub fn moved(position: Point) -> Self {
        Self {
            kind: MouseEventKind::Move,
            position: Some(position),
            button: None,
            wheel: None,
        }
    }

    pub fn down(position: Point, button: MouseButton) -> Self {
        Self {
            kind: MouseEventKind::Down,
            position: Some(position),
            button: Some(button),
            wheel: None,
        }
    }

    pub fn up(position: Point, button: MouseButton) -> Self {
        Self {
            kind: MouseEventKind::Up,
            position: Some(position),
            button: Some(button),
            wheel: None,
        }
    }

    /// Pointer left the canvas.
    pub fn out() -> Self {
        Self {
            kind: MouseEventKind::Out,
            position: None,
            button: None,
            wheel: None,
        }
    }

    pub fn wheel(position: Point, delta: WheelDelta) -> Self {
        Self {
            kind: MouseEventKind::Wheel,
            position: Some(position),
            button: None,
            wheel: Some(delta),
        }
    }

    pub fn dbl_click(position: Point) -> Self {
        Self {
            kind: MouseEventKind::DblClick,
            position: Some(position),
            button: None,
            wheel: None,
        }
    }

    pub fn context_menu(position: Point) -> Self {
        Self {
            kind: MouseEventKind::ContextMenu,
            position: Some(position),
            button: None,
            wheel: None,
        }
    }
}

struct Subscriber {
    id: ElementId,
    drawable: Weak<std::cell::RefCell<dyn crate::element::Drawable>>,
    layer_z: Rc<Cell<i32>>,
}

/// Pointer event router.
///
/// Routing is pure synthesis: each raw event updates a little state
/// (position, in-canvas flag, over/down tracking, the shared button table)
/// and returns the full list of element dispatches. The stage fans those out
/// to listeners and behaviors; nothing here calls user code.
///
/// Top-most resolution uses the composite key (layer z, element z): sorting
/// subscribers descending, a hit is "over" while its key is at or above the
/// running maxima, so elements tied on both z values are simultaneously
/// over. Everything else receives the `away:` mirror of the event.
pub struct MouseRouter {
    subscribers: Vec<Subscriber>,
    input: SharedInputState,
    position: Point,
    in_canvas: bool,
    /// Elements currently under the pointer.
    last_move: Vec<ElementId>,
    /// Elements the last mousedown landed on, for click synthesis.
    last_down: Vec<ElementId>,
}

impl MouseRouter {
    pub fn new(input: SharedInputState) -> Self {
        Self {
            subscribers: Vec::new(),
            input,
            position: Point::ZERO,
            in_canvas: false,
            last_move: Vec::new(),
            last_down: Vec::new(),
        }
    }

    /// Register an element for pointer events. `layer_z` is the shared cell
    /// owned by the element's layer, so layer reordering is picked up
    /// without re-subscription.
    pub fn subscribe(&mut self, id: ElementId, drawable: &SharedDrawable, layer_z: Rc<Cell<i32>>) {
        self.subscribers.push(Subscriber {
            id,
            drawable: Rc::downgrade(drawable),
            layer_z,
        });
    }

    pub fn unsubscribe(&mut self, id: ElementId) {
        self.subscribers.retain(|s| s.id != id);
        self.last_move.retain(|&m| m != id);
        self.last_down.retain(|&d| d != id);
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    #[inline]
    pub fn in_canvas(&self) -> bool {
        self.in_canvas
    }

    /// Route one raw event into element dispatches.
    pub fn route(&mut self, event: &MouseEvent) -> Vec<Dispatch> {
        if let Some(p) = event.position {
            self.position = p;
            self.in_canvas = true;
        }
        match event.kind {
            MouseEventKind::Out => self.in_canvas = false,
            MouseEventKind::Down => {
                if let Some(b) = event.button {
                    self.input.borrow_mut().press_button(b);
                }
                self.last_down.clear();
            }
            MouseEventKind::Up => {
                if let Some(b) = event.button {
                    self.input.borrow_mut().release_button(b);
                }
            }
            _ => {}
        }

        // Partition subscribers into over/out by descending composite key.
        self.subscribers.retain(|s| s.drawable.strong_count() > 0);
        let mut entries: Vec<(ElementId, i32, i32, bool)> = self
            .subscribers
            .iter()
            .filter_map(|s| {
                let drawable = s.drawable.upgrade()?;
                let d = drawable.borrow();
                let hit = self.in_canvas && d.shape().contains(self.position);
                Some((s.id, s.layer_z.get(), d.z_index(), hit))
            })
            .collect();
        entries.sort_by(|a, b| (b.1, b.2).cmp(&(a.1, a.2)));

        let mut over = Vec::new();
        let mut out = Vec::new();
        let mut max_key: Option<(i32, i32)> = None;
        for (id, layer_z, elem_z, hit) in entries {
            let on_top = max_key.is_none_or(|(ml, me)| layer_z >= ml && elem_z >= me);
            if hit && on_top {
                max_key = Some((layer_z, elem_z));
                over.push(id);
            } else {
                out.push(id);
            }
        }

        let mut dispatches = Vec::new();
        for id in over {
            match event.kind {
                MouseEventKind::Move => {
                    if !self.last_move.contains(&id) {
                        dispatches.push(Dispatch::new(id, ElementEvent::MouseOver));
                        self.last_move.push(id);
                    }
                }
                MouseEventKind::Down => self.last_down.push(id),
                MouseEventKind::Up => {
                    if self.last_down.contains(&id) {
                        dispatches.push(Dispatch::new(id, ElementEvent::Click));
                    }
                }
                _ => {}
            }
            let payload = match (event.kind, event.wheel) {
                (MouseEventKind::Wheel, Some(delta)) => {
                    let delta = delta.normalize();
                    ElementEvent::Wheel {
                        delta,
                        up: delta > 0.0,
                        down: delta < 0.0,
                    }
                }
                _ => ElementEvent::Raw(event.kind),
            };
            dispatches.push(Dispatch::new(id, payload));
        }

        for id in out {
            let was_over = self.last_move.contains(&id);
            let leaving = matches!(event.kind, MouseEventKind::Move | MouseEventKind::Out);
            if leaving && was_over {
                dispatches.push(Dispatch::new(id, ElementEvent::MouseOut));
                if event.kind == MouseEventKind::Out {
                    dispatches.push(Dispatch::new(id, ElementEvent::LeftCanvas));
                }
                self.last_move.retain(|&m| m != id);
            } else {
                dispatches.push(Dispatch::new(id, ElementEvent::Away(event.kind)));
            }
        }

        trace!(kind = ?event.kind, count = dispatches.len(), "mouse routed");
        dispatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ShapeElement;
    use crate::input_state::InputState;
    use std::cell::RefCell;
    use tela_geometry::{Rect, Size};

    struct Fixture {
        router: MouseRouter,
        input: SharedInputState,
    }

    impl Fixture {
        fn new() -> Self {
            let input = InputState::shared();
            Self {
                router: MouseRouter::new(input.clone()),
                input,
            }
        }

        fn add_rect(&mut self, id: ElementId, at: Point, z: i32, layer_z: i32) -> SharedDrawable {
            let elem: SharedDrawable = Rc::new(RefCell::new(
                ShapeElement::new(Box::new(Rect::with_size(at, Size::new(10.0, 10.0))))
                    .with_z_index(z),
            ));
            self.router
                .subscribe(id, &elem, Rc::new(Cell::new(layer_z)));
            elem
        }
    }

    fn events_for(dispatches: &[Dispatch], id: ElementId) -> Vec<ElementEvent> {
        dispatches
            .iter()
            .filter(|d| d.target == id)
            .map(|d| d.event.clone())
            .collect()
    }

    #[test]
    fn test_topmost_element_wins() {
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 1, 1);
        let _b = fx.add_rect(2, Point::ZERO, 2, 1); // same layer, higher z
        let d = fx.router.route(&MouseEvent::moved(Point::new(5.0, 5.0)));
        assert_eq!(
            events_for(&d, 2),
            vec![ElementEvent::MouseOver, ElementEvent::Raw(MouseEventKind::Move)]
        );
        assert_eq!(
            events_for(&d, 1),
            vec![ElementEvent::Away(MouseEventKind::Move)]
        );
    }

    #[test]
    fn test_layer_z_outranks_element_z() {
        let mut fx = Fixture::new();
        let _low_layer = fx.add_rect(1, Point::ZERO, 100, 1);
        let _high_layer = fx.add_rect(2, Point::ZERO, 0, 2);
        let d = fx.router.route(&MouseEvent::moved(Point::new(5.0, 5.0)));
        assert!(events_for(&d, 2).contains(&ElementEvent::MouseOver));
        assert!(!events_for(&d, 1).contains(&ElementEvent::MouseOver));
    }

    #[test]
    fn test_tied_composite_keys_both_over() {
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 5, 1);
        let _b = fx.add_rect(2, Point::ZERO, 5, 1);
        let d = fx.router.route(&MouseEvent::moved(Point::new(5.0, 5.0)));
        assert!(events_for(&d, 1).contains(&ElementEvent::MouseOver));
        assert!(events_for(&d, 2).contains(&ElementEvent::MouseOver));
    }

    #[test]
    fn test_over_then_out_on_leave() {
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 1, 1);
        fx.router.route(&MouseEvent::moved(Point::new(5.0, 5.0)));
        // Second move inside: no repeated mouseover.
        let again = fx.router.route(&MouseEvent::moved(Point::new(6.0, 6.0)));
        assert_eq!(
            events_for(&again, 1),
            vec![ElementEvent::Raw(MouseEventKind::Move)]
        );
        let left = fx.router.route(&MouseEvent::moved(Point::new(50.0, 50.0)));
        assert_eq!(events_for(&left, 1), vec![ElementEvent::MouseOut]);
    }

    #[test]
    fn test_left_canvas() {
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 1, 1);
        fx.router.route(&MouseEvent::moved(Point::new(5.0, 5.0)));
        let d = fx.router.route(&MouseEvent::out());
        assert_eq!(
            events_for(&d, 1),
            vec![ElementEvent::MouseOut, ElementEvent::LeftCanvas]
        );
        assert!(!fx.router.in_canvas());
    }

    #[test]
    fn test_click_requires_down_and_up_on_element() {
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 1, 1);
        fx.router
            .route(&MouseEvent::down(Point::new(5.0, 5.0), MouseButton::Left));
        assert!(fx.input.borrow().is_button_down(MouseButton::Left));
        let d = fx
            .router
            .route(&MouseEvent::up(Point::new(5.0, 5.0), MouseButton::Left));
        assert!(events_for(&d, 1).contains(&ElementEvent::Click));
        assert!(!fx.input.borrow().is_button_down(MouseButton::Left));
    }

    #[test]
    fn test_no_click_when_down_was_elsewhere() {
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 1, 1);
        fx.router
            .route(&MouseEvent::down(Point::new(50.0, 50.0), MouseButton::Left));
        let d = fx
            .router
            .route(&MouseEvent::up(Point::new(5.0, 5.0), MouseButton::Left));
        assert!(!events_for(&d, 1).contains(&ElementEvent::Click));
    }

    #[test]
    fn test_down_clears_previous_press_targets() {
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 1, 1);
        fx.router
            .route(&MouseEvent::down(Point::new(5.0, 5.0), MouseButton::Left));
        // A second press elsewhere forgets the first press target.
        fx.router
            .route(&MouseEvent::down(Point::new(50.0, 50.0), MouseButton::Left));
        let d = fx
            .router
            .route(&MouseEvent::up(Point::new(5.0, 5.0), MouseButton::Left));
        assert!(!events_for(&d, 1).contains(&ElementEvent::Click));
    }

    #[test]
    fn test_wheel_normalization() {
        assert_eq!(WheelDelta::Multiples(240.0).normalize(), 2.0);
        assert_eq!(WheelDelta::Lines(-3.0).normalize(), 1.0);
        let mut fx = Fixture::new();
        let _a = fx.add_rect(1, Point::ZERO, 1, 1);
        let d = fx.router.route(&MouseEvent::wheel(
            Point::new(5.0, 5.0),
            WheelDelta::Multiples(-120.0),
        ));
        assert_eq!(
            events_for(&d, 1),
            vec![ElementEvent::Wheel {
                delta: -1.0,
                up: false,
                down: true,
            }]
        );
        let d = fx.router.route(&MouseEvent::wheel(
            Point::new(5.0, 5.0),
            WheelDelta::Lines(-6.0),
        ));
        assert_eq!(
            events_for(&d, 1),
            vec![ElementEvent::Wheel {
                delta: 2.0,
                up: true,
                down: false,
            }]
        );
    }

    #[test]
    fn test_dead_subscribers_pruned() {
        let mut fx = Fixture::new();
        let a = fx.add_rect(1, Point::ZERO, 1, 1);
        drop(a);
        let d = fx.router.route(&MouseEvent::moved(Point::new(5.0, 5.0)));
        assert!(d.is_empty());
    }
}
