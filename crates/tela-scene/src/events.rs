use tela_geometry::Vector;

use crate::element::ElementId;

/// Raw pointer event kinds arriving from the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Move,
    Down,
    Up,
    /// Pointer left the canvas entirely.
    Out,
    DblClick,
    ContextMenu,
    Wheel,
}

/// Events delivered to element subscribers.
///
/// `Raw` events go to elements the pointer is over; `Away` variants are the
/// same raw kinds delivered to subscribed elements the pointer is *not*
/// over, which is what drag logic needs to keep tracking a fast pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    MouseOver,
    MouseOut,
    /// Pointer left the canvas while over this element.
    LeftCanvas,
    /// Down and up both landed on this element.
    Click,
    Raw(MouseEventKind),
    Away(MouseEventKind),
    Wheel {
        /// Normalized: positive is wheel-up.
        delta: f64,
        up: bool,
        down: bool,
    },
    StartDrag,
    MoveDrag(Vector),
    StopDrag,
    /// Drag released: over the contained drop target, or `None` when dropped
    /// on nothing.
    Dropped(Option<ElementId>),
    /// `hover`/`active` flags changed (from `Clickable`).
    StatusChanged,
    /// Speed-based motion progressed this tick.
    Moving(Vector),
    MoveEnd,
}

/// Hashable discriminant of [`ElementEvent`], used as the listener key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    MouseOver,
    MouseOut,
    LeftCanvas,
    Click,
    Raw(MouseEventKind),
    Away(MouseEventKind),
    Wheel,
    StartDrag,
    MoveDrag,
    StopDrag,
    Dropped,
    StatusChanged,
    Moving,
    MoveEnd,
}

impl ElementEvent {
    pub fn key(&self) -> EventKey {
        match self {
            ElementEvent::MouseOver => EventKey::MouseOver,
            ElementEvent::MouseOut => EventKey::MouseOut,
            ElementEvent::LeftCanvas => EventKey::LeftCanvas,
            ElementEvent::Click => EventKey::Click,
            ElementEvent::Raw(k) => EventKey::Raw(*k),
            ElementEvent::Away(k) => EventKey::Away(*k),
            ElementEvent::Wheel { .. } => EventKey::Wheel,
            ElementEvent::StartDrag => EventKey::StartDrag,
            ElementEvent::MoveDrag(_) => EventKey::MoveDrag,
            ElementEvent::StopDrag => EventKey::StopDrag,
            ElementEvent::Dropped(_) => EventKey::Dropped,
            ElementEvent::StatusChanged => EventKey::StatusChanged,
            ElementEvent::Moving(_) => EventKey::Moving,
            ElementEvent::MoveEnd => EventKey::MoveEnd,
        }
    }
}

/// One synthesized delivery: which element, what event.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub target: ElementId,
    pub event: ElementEvent,
}

impl Dispatch {
    pub fn new(target: ElementId, event: ElementEvent) -> Self {
        Self { target, event }
    }
}
