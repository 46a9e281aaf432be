//! Keyboard shortcuts.

use crate::actions::{FormatAction, Key, KeyCombo, Modifiers};
use crate::app::{Command, EditorMode};

/// Maps key combinations to commands. The primary modifier is Cmd on
/// macOS and Ctrl elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keymap {
    pub is_mac: bool,
}

impl Keymap {
    pub fn new(is_mac: bool) -> Self {
        Self { is_mac }
    }

    pub fn resolve(&self, combo: &KeyCombo) -> Option<Command> {
        let primary = Modifiers::primary(self.is_mac);
        let primary_shift = Modifiers::primary_shift(self.is_mac);
        let key = &combo.key;

        if combo.modifiers == primary_shift {
            return if key.is_char('e') {
                Some(Command::SetMode(EditorMode::Edit))
            } else if key.is_char('s') {
                Some(Command::SetMode(EditorMode::Split))
            } else if key.is_char('p') {
                Some(Command::SetMode(EditorMode::Preview))
            } else if key.is_char('c') {
                Some(Command::Format(FormatAction::CodeBlock))
            } else {
                None
            };
        }

        if combo.modifiers == primary {
            if *key == Key::Space {
                return Some(Command::ToggleAiMenu);
            }
            let command = [
                ('s', Command::Save),
                ('f', Command::ToggleSearch),
                ('b', Command::Format(FormatAction::Bold)),
                ('i', Command::Format(FormatAction::Italic)),
                ('k', Command::Format(FormatAction::Link)),
                ('l', Command::Format(FormatAction::List)),
            ]
            .into_iter()
            .find_map(|(c, command)| key.is_char(c).then_some(command));
            return command;
        }

        if combo.modifiers == Modifiers::NONE && *key == Key::Escape {
            return Some(Command::Escape);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(c: &str) -> Key {
        Key::character(c)
    }

    #[test]
    fn test_primary_bindings() {
        let keymap = Keymap::new(false);
        let resolve = |key| keymap.resolve(&KeyCombo::primary(key, false));
        assert_eq!(resolve(ch("s")), Some(Command::Save));
        assert_eq!(resolve(ch("f")), Some(Command::ToggleSearch));
        assert_eq!(resolve(Key::Space), Some(Command::ToggleAiMenu));
        assert_eq!(resolve(ch("b")), Some(Command::Format(FormatAction::Bold)));
        assert_eq!(resolve(ch("i")), Some(Command::Format(FormatAction::Italic)));
        assert_eq!(resolve(ch("k")), Some(Command::Format(FormatAction::Link)));
        assert_eq!(resolve(ch("l")), Some(Command::Format(FormatAction::List)));
        assert_eq!(resolve(ch("z")), None);
    }

    #[test]
    fn test_shifted_bindings_accept_either_case() {
        let keymap = Keymap::new(true);
        let resolve = |key| keymap.resolve(&KeyCombo::primary_shift(key, true));
        assert_eq!(resolve(ch("E")), Some(Command::SetMode(EditorMode::Edit)));
        assert_eq!(resolve(ch("s")), Some(Command::SetMode(EditorMode::Split)));
        assert_eq!(resolve(ch("P")), Some(Command::SetMode(EditorMode::Preview)));
        assert_eq!(resolve(ch("C")), Some(Command::Format(FormatAction::CodeBlock)));
    }

    #[test]
    fn test_platform_modifier() {
        let mac = Keymap::new(true);
        assert_eq!(mac.resolve(&KeyCombo::primary(ch("s"), false)), None);
        assert_eq!(mac.resolve(&KeyCombo::primary(ch("s"), true)), Some(Command::Save));
        assert_eq!(mac.resolve(&KeyCombo::new(Key::Escape)), Some(Command::Escape));
        assert_eq!(mac.resolve(&KeyCombo::new(ch("s"))), None);
    }
}
