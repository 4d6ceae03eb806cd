//! Scene graph, animation, and input routing.
//!
//! The crate is organized around one [`Stage`]: a stack of z-ordered
//! [`Layer`]s drawn onto a [`tela_surface::Surface`], a cooperative frame
//! scheduler ([`Invoker`]) the embedder ticks from its own loop, a property
//! tween engine ([`Animator`]) with a dash-token easing grammar, and pointer
//! and keyboard routers that turn raw embedder events into per-element
//! dispatches consumed by the interaction behaviors (click, drag, drop,
//! link, move).
//!
//! Everything is single-threaded; shared structure uses `Rc<RefCell<_>>` and
//! the clock behind the scheduler is injected, so tests drive time by hand.

pub mod animation;
pub mod behaviors;
pub mod clock;
pub mod easing;
pub mod element;
mod error;
pub mod events;
pub mod input_state;
pub mod invoker;
pub mod keyboard;
pub mod layer;
pub mod mouse;
pub mod preloader;
pub mod processors;
pub mod stage;

pub use animation::{
    AnimationTarget, Animator, PropertyValue, SharedAnimator, SharedTarget, TweenHandle, TweenSpec,
};
pub use behaviors::{Clickable, DragController, Droppable, Linkable, Moveable, SharedElement};
pub use clock::{Clock, ManualClock, SystemClock};
pub use easing::Easing;
pub use element::{Drawable, ElementId, ShapeElement, SharedDrawable};
pub use error::SceneError;
pub use events::{Dispatch, ElementEvent, EventKey, MouseEventKind};
pub use input_state::{InputState, MouseButton, SharedInputState};
pub use invoker::{
    Invoker, TaskId, TaskOutcome, PRIORITY_ANIMATION, PRIORITY_DEFAULT, PRIORITY_RENDER,
};
pub use keyboard::{Key, KeyAction, KeyEvent, KeyInput, KeyboardRouter, PreventList};
pub use layer::{ClearMode, Layer};
pub use mouse::{MouseEvent, MouseRouter, WheelDelta};
pub use preloader::ImagePreloader;
pub use processors::{Clearer, Grayscale, HsbShift, Invert, Processor};
pub use stage::{LayerOptions, Stage, StageOptions};

// The seams behaviors and embedders plug into must stay object safe.
static_assertions::assert_obj_safe!(
    clock::Clock,
    element::Drawable,
    animation::AnimationTarget,
    processors::Processor
);
