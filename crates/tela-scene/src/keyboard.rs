use std::collections::HashSet;

use crate::input_state::SharedInputState;

/// Logical key identity, independent of layout scan codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letters and digits, lowercased.
    Char(char),
    Enter,
    Escape,
    Space,
    Tab,
    Backspace,
    Delete,
    Insert,
    Shift,
    Ctrl,
    Alt,
    CapsLock,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl Key {
    /// Parse the names accepted in config prevent-lists.
    pub fn parse(name: &str) -> Option<Key> {
        let n = name.trim().to_ascii_lowercase();
        Some(match n.as_str() {
            "enter" | "return" => Key::Enter,
            "escape" | "esc" => Key::Escape,
            "space" => Key::Space,
            "tab" => Key::Tab,
            "backspace" => Key::Backspace,
            "delete" => Key::Delete,
            "insert" => Key::Insert,
            "shift" => Key::Shift,
            "ctrl" | "control" => Key::Ctrl,
            "alt" => Key::Alt,
            "capslock" => Key::CapsLock,
            "up" => Key::ArrowUp,
            "down" => Key::ArrowDown,
            "left" => Key::ArrowLeft,
            "right" => Key::ArrowRight,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            _ => {
                if let Some(num) = n.strip_prefix('f') {
                    return num.parse::<u8>().ok().map(Key::F);
                }
                let mut chars = n.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => Key::Char(c),
                    _ => return None,
                }
            }
        })
    }
}

/// Raw keyboard transition from the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
    /// Character-producing repeat/press, no state change.
    Press,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub action: KeyAction,
}

/// Routed keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
    Typed(Key),
}

/// Which key events the embedder should default-prevent.
#[derive(Debug, Clone, Default)]
pub enum PreventList {
    #[default]
    None,
    All,
    Keys(HashSet<Key>),
}

impl PreventList {
    fn applies(&self, key: Key) -> bool {
        match self {
            PreventList::None => false,
            PreventList::All => true,
            PreventList::Keys(keys) => keys.contains(&key),
        }
    }
}

/// Keyboard router: maintains the shared key table and annotates each event
/// with the prevent-default decision.
pub struct KeyboardRouter {
    input: SharedInputState,
    prevent: PreventList,
}

impl KeyboardRouter {
    pub fn new(input: SharedInputState, prevent: PreventList) -> Self {
        Self { input, prevent }
    }

    pub fn set_prevent(&mut self, prevent: PreventList) {
        self.prevent = prevent;
    }

    /// Update key state and translate the transition. The bool is the
    /// prevent-default decision for this input.
    pub fn route(&mut self, input: KeyInput) -> (KeyEvent, bool) {
        let event = match input.action {
            KeyAction::Down => {
                self.input.borrow_mut().press_key(input.key);
                KeyEvent::Pressed(input.key)
            }
            KeyAction::Up => {
                self.input.borrow_mut().release_key(input.key);
                KeyEvent::Released(input.key)
            }
            KeyAction::Press => KeyEvent::Typed(input.key),
        };
        (event, self.prevent.applies(input.key))
    }

    /// Current held state of `key`.
    pub fn key_state(&self, key: Key) -> bool {
        self.input.borrow().is_key_down(key)
    }

    /// Whether any key at all is held.
    pub fn any_key_down(&self) -> bool {
        self.input.borrow().any_key_down()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_state::InputState;

    fn router(prevent: PreventList) -> KeyboardRouter {
        KeyboardRouter::new(InputState::shared(), prevent)
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("Space"), Some(Key::Space));
        assert_eq!(Key::parse("a"), Some(Key::Char('a')));
        assert_eq!(Key::parse("f5"), Some(Key::F(5)));
        assert_eq!(Key::parse("banana"), None);
    }

    #[test]
    fn test_state_follows_down_up() {
        let mut r = router(PreventList::None);
        let (event, prevent) = r.route(KeyInput {
            key: Key::Char('w'),
            action: KeyAction::Down,
        });
        assert_eq!(event, KeyEvent::Pressed(Key::Char('w')));
        assert!(!prevent);
        assert!(r.key_state(Key::Char('w')));
        r.route(KeyInput {
            key: Key::Char('w'),
            action: KeyAction::Up,
        });
        assert!(!r.key_state(Key::Char('w')));
    }

    #[test]
    fn test_press_leaves_state_untouched() {
        let mut r = router(PreventList::All);
        let (event, prevent) = r.route(KeyInput {
            key: Key::Enter,
            action: KeyAction::Press,
        });
        assert_eq!(event, KeyEvent::Typed(Key::Enter));
        assert!(prevent);
        assert!(!r.key_state(Key::Enter));
    }

    #[test]
    fn test_prevent_list_keys() {
        let mut keys = HashSet::new();
        keys.insert(Key::Space);
        let mut r = router(PreventList::Keys(keys));
        let (_, prevent_space) = r.route(KeyInput {
            key: Key::Space,
            action: KeyAction::Down,
        });
        let (_, prevent_a) = r.route(KeyInput {
            key: Key::Char('a'),
            action: KeyAction::Down,
        });
        assert!(prevent_space);
        assert!(!prevent_a);
    }
}
