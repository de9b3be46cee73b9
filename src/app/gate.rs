// Permission gate - pure predicate deciding command legality per mode
//
// Rules evaluate in order; the first matching veto wins. Private
// commands never reach the gate (the dispatcher runs them
// unconditionally).

use crate::command::CommandId;
use crate::state::popup::PopupKind;
use crate::state::State;

/// Whether `cmd` may run against the current state. Silent denial is
/// intentional UI behavior, not an error.
pub fn command_allowed(state: &State, cmd: &CommandId) -> bool {
    use CommandId::*;

    // 1. Nothing before the transport is connected.
    if !state.is_connected {
        return false;
    }

    // 2. Nothing while loading, except while the jump popup is active
    //    (jump stays interactive during background enumeration).
    if state.is_loading && state.popup != Some(PopupKind::Jump) {
        return false;
    }

    // 3. Only confirm while unauthenticated.
    if !state.is_authenticated && !matches!(cmd, Confirm) {
        return false;
    }

    // 4. Prompts, messages and non-menu popups force yes/no, unless a
    //    search is still pending (its live filter stays interactive).
    let non_menu_popup = state.popup.is_some() && !state.is_menuing();
    let search_pending = state.popup == Some(PopupKind::Search) && state.search.is_pending;
    if (state.prompt.is_enabled || state.message.is_enabled || non_menu_popup)
        && !search_pending
        && !matches!(cmd, Confirm | Reject | Quit | TtyQuit)
    {
        return false;
    }

    // 5. Menu-family popups force arrow/yes/no navigation.
    if state.is_menuing() && !matches!(cmd, ScrollUp | ScrollDown | Confirm | Reject | Quit) {
        return false;
    }

    // 6. No second popup while one is active.
    if state.popup.is_some() && opens_popup(cmd) {
        return false;
    }

    // 7. No inspect-of-inspect.
    if state.inspector.is_enabled && matches!(cmd, Confirm) && !state.search.is_enabled {
        return false;
    }

    // 8. First-run state with no tab data: a fixed allowlist only.
    if state.data_set_empty()
        && !matches!(
            cmd,
            ScrollUp
                | ScrollDown
                | Confirm
                | Reject
                | Quit
                | AgentPicker
                | HostPicker
                | Parameters
                | ShellSystem
                | Message(_)
                | Prompt(_)
                | Overview
        )
    {
        return false;
    }

    true
}

fn opens_popup(cmd: &CommandId) -> bool {
    use CommandId::*;
    matches!(
        cmd,
        Menu | Bulk
            | Prompt(_)
            | Message(_)
            | Help
            | Overview
            | Jump
            | Search
            | Parameters
            | ThemePicker
            | AgentPicker
            | HostPicker
            | ShellSystem
            | ShellContainer
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tab::Tab;

    fn ready_state() -> State {
        let mut state = State::default();
        state.is_connected = true;
        state.is_authenticated = true;
        state.tabs.push(Tab {
            key: "containers".into(),
            ..Tab::default()
        });
        state.navigation.current_tab = Some("containers".into());
        state
    }

    #[test]
    fn test_disconnected_denies_everything() {
        let state = State::default();
        assert!(!command_allowed(&state, &CommandId::Confirm));
        assert!(!command_allowed(&state, &CommandId::ScrollUp));
    }

    #[test]
    fn test_loading_denies_unless_jump_active() {
        let mut state = ready_state();
        state.is_loading = true;
        assert!(!command_allowed(&state, &CommandId::Remove));
        assert!(!command_allowed(&state, &CommandId::ScrollDown));

        state.popup = Some(PopupKind::Jump);
        assert!(command_allowed(&state, &CommandId::ScrollDown));
    }

    #[test]
    fn test_unauthenticated_allows_only_confirm() {
        let mut state = ready_state();
        state.is_authenticated = false;
        assert!(command_allowed(&state, &CommandId::Confirm));
        assert!(!command_allowed(&state, &CommandId::Menu));
        assert!(!command_allowed(&state, &CommandId::Reject));
    }

    #[test]
    fn test_prompt_forces_yes_no() {
        let mut state = ready_state();
        state.popup = Some(PopupKind::Prompt);
        state.prompt.is_enabled = true;
        assert!(command_allowed(&state, &CommandId::Confirm));
        assert!(command_allowed(&state, &CommandId::Reject));
        assert!(command_allowed(&state, &CommandId::Quit));
        assert!(!command_allowed(&state, &CommandId::ScrollUp));
        assert!(!command_allowed(&state, &CommandId::Menu));
    }

    #[test]
    fn test_menu_family_allows_arrows() {
        let mut state = ready_state();
        state.popup = Some(PopupKind::Menu(crate::state::popup::MenuKind::Bulk));
        assert!(command_allowed(&state, &CommandId::ScrollUp));
        assert!(command_allowed(&state, &CommandId::ScrollDown));
        assert!(command_allowed(&state, &CommandId::Confirm));
        assert!(!command_allowed(&state, &CommandId::NextTab));
        assert!(!command_allowed(&state, &CommandId::Remove));
    }

    #[test]
    fn test_no_second_popup() {
        let mut state = ready_state();
        state.popup = Some(PopupKind::Help);
        assert!(!command_allowed(&state, &CommandId::Jump));
        assert!(!command_allowed(&state, &CommandId::Menu));
    }

    #[test]
    fn test_no_inspect_of_inspect() {
        let mut state = ready_state();
        state.inspector.is_enabled = true;
        assert!(!command_allowed(&state, &CommandId::Confirm));
        // Reject stays legal so the inspector can be left
        assert!(command_allowed(&state, &CommandId::Reject));
    }

    #[test]
    fn test_empty_data_set_allowlist() {
        let mut state = ready_state();
        state.tabs.clear();
        assert!(command_allowed(&state, &CommandId::Overview));
        assert!(command_allowed(&state, &CommandId::ShellSystem));
        assert!(command_allowed(&state, &CommandId::AgentPicker));
        assert!(!command_allowed(&state, &CommandId::Menu));
        assert!(!command_allowed(&state, &CommandId::Remove));
        assert!(!command_allowed(&state, &CommandId::NextTab));
    }
}
