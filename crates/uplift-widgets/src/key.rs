//! Key bindings shared by the keyboard-driven widgets.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One or more key combinations that trigger the same action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
}

/// A key press with the modifiers that must be held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombination {
    /// Base key.
    pub code: KeyCode,
    /// Required modifiers.
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Binding for a single combination.
    pub fn new(key: KeyCombination) -> Self {
        Self { keys: vec![key] }
    }

    /// Binding for several combinations.
    pub fn with_keys(keys: Vec<KeyCombination>) -> Self {
        Self { keys }
    }

    /// Whether `event` presses one of the combinations, holding at least its modifiers.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys
            .iter()
            .any(|k| k.code == event.code && event.modifiers.contains(k.modifiers))
    }
}

impl KeyCombination {
    /// Combination without modifiers.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Combination with Shift held.
    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }
}

/// Keys for moving through an ordered set (options, triggers, cells).
#[derive(Debug, Clone)]
pub struct NavKeys {
    /// Next item.
    pub next: Binding,
    /// Previous item.
    pub prev: Binding,
    /// First item.
    pub first: Binding,
    /// Last item.
    pub last: Binding,
    /// Commit the highlighted item.
    pub commit: Binding,
    /// Close without committing.
    pub dismiss: Binding,
}

impl Default for NavKeys {
    fn default() -> Self {
        Self {
            next: Binding::new(KeyCombination::new(KeyCode::Down)),
            prev: Binding::new(KeyCombination::new(KeyCode::Up)),
            first: Binding::new(KeyCombination::new(KeyCode::Home)),
            last: Binding::new(KeyCombination::new(KeyCode::End)),
            commit: Binding::new(KeyCombination::new(KeyCode::Enter)),
            dismiss: Binding::new(KeyCombination::new(KeyCode::Esc)),
        }
    }
}

/// Keys for cycling focus inside a dialog.
#[derive(Debug, Clone)]
pub struct TrapKeys {
    /// Focus the next element.
    pub forward: Binding,
    /// Focus the previous element.
    pub backward: Binding,
    /// Close the dialog.
    pub dismiss: Binding,
}

impl Default for TrapKeys {
    fn default() -> Self {
        Self {
            forward: Binding::new(KeyCombination::new(KeyCode::Tab)),
            backward: Binding::with_keys(vec![
                KeyCombination::new(KeyCode::BackTab),
                KeyCombination::shift(KeyCode::Tab),
            ]),
            dismiss: Binding::new(KeyCombination::new(KeyCode::Esc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn binding_matches_its_keys() {
        let keys = NavKeys::default();
        assert!(keys.next.matches(&key(KeyCode::Down, KeyModifiers::NONE)));
        assert!(!keys.next.matches(&key(KeyCode::Up, KeyModifiers::NONE)));
        assert!(keys.dismiss.matches(&key(KeyCode::Esc, KeyModifiers::NONE)));
    }

    #[test]
    fn required_modifiers_must_be_held() {
        let keys = TrapKeys::default();
        let shift_tab = key(KeyCode::Tab, KeyModifiers::SHIFT);
        assert!(keys.backward.matches(&shift_tab));
        assert!(keys.backward.matches(&key(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert!(!keys.backward.matches(&key(KeyCode::Tab, KeyModifiers::NONE)));
        // Unmodified bindings also accept modified presses; callers test the
        // more specific binding first.
        assert!(keys.forward.matches(&shift_tab));
    }
}
