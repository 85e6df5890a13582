//! Keyboard shortcuts and pointer hit targets.

use serde::{Deserialize, Serialize};

use crate::element::ElementRef;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Control on most platforms, Command on macOS.
    #[must_use]
    pub const fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press delivered to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// Key name as reported by the host (`"z"`, `"Delete"`, ...).
    pub key: String,
    /// Modifier state.
    #[serde(default)]
    pub modifiers: KeyModifiers,
    /// Whether a text input or textarea currently has focus.
    #[serde(default)]
    pub input_focused: bool,
}

impl KeyEvent {
    /// A key press with no modifiers outside any input field.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers::default(),
            input_focused: false,
        }
    }

    /// Same event with the given modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Same event marked as typed inside an input field.
    #[must_use]
    pub fn in_input(mut self) -> Self {
        self.input_focused = true;
        self
    }
}

/// Editor commands bound to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shortcut {
    /// Delete or Backspace outside an input field.
    DeleteSelected,
    /// Ctrl/Cmd+Z.
    Undo,
    /// Ctrl/Cmd+Shift+Z or Ctrl/Cmd+Y.
    Redo,
}

impl Shortcut {
    /// Map a key press to a shortcut.
    #[must_use]
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        let key = event.key.as_str();

        if event.modifiers.command() {
            if key.eq_ignore_ascii_case("z") {
                return Some(if event.modifiers.shift {
                    Self::Redo
                } else {
                    Self::Undo
                });
            }
            if key.eq_ignore_ascii_case("y") {
                return Some(Self::Redo);
            }
        }

        if (key == "Delete" || key == "Backspace") && !event.input_focused {
            return Some(Self::DeleteSelected);
        }
        None
    }
}

/// What a pointer press on the stage landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "camelCase")]
pub enum HitTarget {
    /// The background image node.
    Background,
    /// Empty stage area.
    Stage,
    /// A text element or sticker.
    Element(ElementRef),
    /// A handle of the transform control.
    TransformHandle,
}

impl HitTarget {
    /// Whether a press here should clear the selection.
    #[must_use]
    pub const fn is_canvas_background(self) -> bool {
        matches!(self, Self::Background | Self::Stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementId;

    fn ctrl() -> KeyModifiers {
        KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        }
    }

    #[test]
    fn test_undo_redo_bindings() {
        let undo = KeyEvent::new("z").with_modifiers(ctrl());
        assert_eq!(Shortcut::from_key_event(&undo), Some(Shortcut::Undo));

        let redo = KeyEvent::new("Z").with_modifiers(KeyModifiers {
            shift: true,
            ..ctrl()
        });
        assert_eq!(Shortcut::from_key_event(&redo), Some(Shortcut::Redo));

        let redo_y = KeyEvent::new("y").with_modifiers(KeyModifiers {
            meta: true,
            ..KeyModifiers::default()
        });
        assert_eq!(Shortcut::from_key_event(&redo_y), Some(Shortcut::Redo));

        assert_eq!(Shortcut::from_key_event(&KeyEvent::new("z")), None);
    }

    #[test]
    fn test_history_keys_work_inside_inputs() {
        let undo = KeyEvent::new("z").with_modifiers(ctrl()).in_input();
        assert_eq!(Shortcut::from_key_event(&undo), Some(Shortcut::Undo));
    }

    #[test]
    fn test_delete_ignored_while_typing() {
        assert_eq!(
            Shortcut::from_key_event(&KeyEvent::new("Backspace")),
            Some(Shortcut::DeleteSelected)
        );
        assert_eq!(
            Shortcut::from_key_event(&KeyEvent::new("Delete").in_input()),
            None
        );
    }

    #[test]
    fn test_hit_targets() {
        assert!(HitTarget::Stage.is_canvas_background());
        assert!(HitTarget::Background.is_canvas_background());
        assert!(!HitTarget::TransformHandle.is_canvas_background());
        let el = HitTarget::Element(ElementRef::text(ElementId::new()));
        assert!(!el.is_canvas_background());
    }
}
