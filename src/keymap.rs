// Keymap - the default binding table from key chords to public commands
//
// The core never reads keys itself; an embedding input surface resolves
// chords through this table and dispatches the named command.

use crate::command::CommandId;

/// Chord notation: lowercase key name, `shift+`/`ctrl+` prefixes in
/// that order. Special keys use their common names (`up`, `enter`, ...).
pub const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    // Movement
    ("up", "scrollUp"),
    ("k", "scrollUp"),
    ("down", "scrollDown"),
    ("j", "scrollDown"),
    ("left", "scrollLeft"),
    ("h", "scrollLeft"),
    ("right", "scrollRight"),
    ("l", "scrollRight"),
    ("tab", "nextTab"),
    ("shift+tab", "previousTab"),
    ("]", "nextSubTab"),
    ("[", "previousSubTab"),
    ("1", "firstTab"),
    ("2", "secondTab"),
    ("3", "thirdTab"),
    ("4", "fourthTab"),
    // Interaction
    ("enter", "confirm"),
    ("escape", "reject"),
    ("q", "quit"),
    ("?", "help"),
    ("x", "menu"),
    ("shift+x", "bulk"),
    // Resource shortcuts
    ("d", "remove"),
    ("p", "pause"),
    ("s", "stop"),
    ("r", "run_restart"),
    ("m", "rename"),
    ("e", "shellContainer"),
    ("shift+e", "shellSystem"),
    ("o", "browser"),
    ("u", "hub"),
    ("shift+p", "pull"),
    ("shift+b", "browse"),
    ("shift+r", "reload"),
    ("g", "project"),
    // Modal surfaces
    ("shift+o", "overview"),
    ("ctrl+p", "jump"),
    ("/", "search"),
    ("ctrl+e", "parameters"),
    ("t", "theme"),
    ("a", "agent"),
    ("shift+h", "host"),
    // Routing and layout
    ("ctrl+a", "nextAgent"),
    ("ctrl+shift+a", "previousAgent"),
    ("ctrl+h", "nextHost"),
    ("ctrl+shift+h", "previousHost"),
    ("+", "nextLayout"),
    ("-", "previousLayout"),
    // TTY
    ("ctrl+q", "ttyQuit"),
];

/// Resolve a chord against the default table.
pub fn command_for(chord: &str) -> Option<CommandId> {
    DEFAULT_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == chord)
        .and_then(|(_, name)| CommandId::from_name(name))
}

/// Bindings active while a TTY session popup is open; consulted before
/// the default table. Enter is not listed here: the surface dispatches
/// it as `TtyExec` carrying the typed line.
pub fn tty_command_for(chord: &str) -> Option<CommandId> {
    match chord {
        "ctrl+l" => Some(CommandId::TtyClear),
        "ctrl+c" => Some(CommandId::TtyErase),
        "ctrl+d" => Some(CommandId::TtyExec("exit".into())),
        "up" => Some(CommandId::TtyHistoryPrevious),
        "down" => Some(CommandId::TtyHistoryNext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_binding_resolves_to_a_public_command() {
        for (chord, name) in DEFAULT_BINDINGS {
            let command = command_for(chord)
                .unwrap_or_else(|| panic!("unresolvable binding: {chord} -> {name}"));
            assert!(!command.is_private(), "{chord} bound to private command");
        }
    }

    #[test]
    fn test_chords_are_unique() {
        for (index, (chord, _)) in DEFAULT_BINDINGS.iter().enumerate() {
            let duplicate = DEFAULT_BINDINGS[index + 1..]
                .iter()
                .any(|(other, _)| other == chord);
            assert!(!duplicate, "duplicate chord: {chord}");
        }
    }

    #[test]
    fn test_vim_style_movement() {
        assert_eq!(command_for("j"), Some(CommandId::ScrollDown));
        assert_eq!(command_for("k"), Some(CommandId::ScrollUp));
        assert_eq!(command_for("1"), Some(CommandId::GoToTab(0)));
    }

    #[test]
    fn test_unbound_chord_is_none() {
        assert_eq!(command_for("ctrl+z"), None);
    }

    #[test]
    fn test_tty_session_bindings() {
        assert_eq!(tty_command_for("ctrl+c"), Some(CommandId::TtyErase));
        assert_eq!(tty_command_for("ctrl+l"), Some(CommandId::TtyClear));
        assert_eq!(
            tty_command_for("ctrl+d"),
            Some(CommandId::TtyExec("exit".into()))
        );
        assert_eq!(tty_command_for("up"), Some(CommandId::TtyHistoryPrevious));
        assert_eq!(tty_command_for("down"), Some(CommandId::TtyHistoryNext));
        // Everything else falls through to the default table
        assert_eq!(tty_command_for("ctrl+q"), None);
    }
}
