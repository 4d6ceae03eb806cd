use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::keyboard::Key;

/// Mouse button identity for down/up events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// The one shared key/button table.
///
/// Both routers write into the same injected instance, so "is shift held"
/// and "is the left button down" have a single answer everywhere; there is
/// no ambient global behind it.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<Key>,
    buttons: HashSet<MouseButton>,
}

pub type SharedInputState = Rc<RefCell<InputState>>;

impl InputState {
    pub fn shared() -> SharedInputState {
        Rc::new(RefCell::new(InputState::default()))
    }

    pub fn press_key(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release_key(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn any_key_down(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn press_button(&mut self, button: MouseButton) {
        self.buttons.insert(button);
    }

    pub fn release_button(&mut self, button: MouseButton) {
        self.buttons.remove(&button);
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Forget everything held, e.g. when the canvas loses OS focus.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_and_button_tracking() {
        let mut s = InputState::default();
        s.press_key(Key::Shift);
        s.press_button(MouseButton::Left);
        assert!(s.is_key_down(Key::Shift));
        assert!(s.any_key_down());
        assert!(s.is_button_down(MouseButton::Left));
        s.release_key(Key::Shift);
        assert!(!s.any_key_down());
        s.release_all();
        assert!(!s.is_button_down(MouseButton::Left));
    }
}
