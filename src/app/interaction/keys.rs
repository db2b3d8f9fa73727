use eframe::egui::{Key, Modifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Shortcut {
    Escape,
    FocusSearch,
    ZoomIn,
    ZoomOut,
    ZoomToFit,
    ToggleLayout,
    ToggleHelp,
}

/// Global keyboard shortcuts. Nothing fires while a text field has focus so
/// typing into search or filter inputs never zooms or toggles modes.
pub(in crate::app) fn shortcut_for_key(
    key: Key,
    modifiers: Modifiers,
    text_focused: bool,
) -> Option<Shortcut> {
    if text_focused {
        return None;
    }

    if modifiers.command || modifiers.ctrl || modifiers.mac_cmd {
        return (key == Key::F).then_some(Shortcut::FocusSearch);
    }
    if modifiers.alt {
        return None;
    }

    match key {
        Key::Escape => Some(Shortcut::Escape),
        Key::Plus | Key::Equals => Some(Shortcut::ZoomIn),
        Key::Minus => Some(Shortcut::ZoomOut),
        Key::Num0 => Some(Shortcut::ZoomToFit),
        Key::H if !modifiers.shift => Some(Shortcut::ToggleLayout),
        Key::Questionmark => Some(Shortcut::ToggleHelp),
        Key::Slash if modifiers.shift => Some(Shortcut::ToggleHelp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_plain_keys() {
        let none = Modifiers::NONE;
        assert_eq!(shortcut_for_key(Key::Escape, none, false), Some(Shortcut::Escape));
        assert_eq!(shortcut_for_key(Key::Equals, none, false), Some(Shortcut::ZoomIn));
        assert_eq!(shortcut_for_key(Key::Plus, none, false), Some(Shortcut::ZoomIn));
        assert_eq!(shortcut_for_key(Key::Minus, none, false), Some(Shortcut::ZoomOut));
        assert_eq!(shortcut_for_key(Key::Num0, none, false), Some(Shortcut::ZoomToFit));
        assert_eq!(shortcut_for_key(Key::H, none, false), Some(Shortcut::ToggleLayout));
        assert_eq!(
            shortcut_for_key(Key::Questionmark, none, false),
            Some(Shortcut::ToggleHelp)
        );
        assert_eq!(
            shortcut_for_key(Key::Slash, Modifiers::SHIFT, false),
            Some(Shortcut::ToggleHelp)
        );
        assert_eq!(shortcut_for_key(Key::F, none, false), None);
    }

    #[test]
    fn command_f_focuses_search() {
        assert_eq!(
            shortcut_for_key(Key::F, Modifiers::COMMAND, false),
            Some(Shortcut::FocusSearch)
        );
        assert_eq!(shortcut_for_key(Key::F, Modifiers::CTRL, false), Some(Shortcut::FocusSearch));
        assert_eq!(shortcut_for_key(Key::H, Modifiers::COMMAND, false), None);
    }

    #[test]
    fn everything_is_ignored_while_typing() {
        for key in [Key::Escape, Key::Num0, Key::H, Key::Minus, Key::F] {
            assert_eq!(shortcut_for_key(key, Modifiers::NONE, true), None);
            assert_eq!(shortcut_for_key(key, Modifiers::COMMAND, true), None);
        }
    }
}
