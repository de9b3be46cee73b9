// App - re-entrant command dispatcher owning the state store
//
// All mutation flows through `run`: gate check for public commands,
// handler execution, then a render signal for the top-level invocation.
// Handlers compose by dispatching further commands on the same stack.

pub mod gate;
mod handlers;
mod notifications;

use std::collections::HashMap;

use crate::command::{CommandId, Effect};
use crate::protocol::Outbound;
use crate::settings::{self, Settings};
use crate::state::State;

pub struct App {
    pub state: State,
    /// Boolean feature switches, toggled from the parameters menu.
    pub features: HashMap<String, bool>,
    effects: Vec<Effect>,
    suppress_next_render: bool,
    depth: usize,
}

impl App {
    pub fn new() -> Self {
        let mut features = HashMap::new();
        features.insert(settings::FEATURE_JUMP_FUZZY.to_string(), true);
        features.insert(settings::FEATURE_LAUNCH_OVERVIEW.to_string(), false);
        features.insert(settings::FEATURE_FOLLOW_LOGS.to_string(), true);
        Self {
            state: State::default(),
            features,
            effects: Vec::new(),
            suppress_next_render: false,
            depth: 0,
        }
    }

    /// Build an app seeded from the persisted settings store.
    pub fn with_settings(store: &Settings) -> Self {
        let mut app = Self::new();
        for key in app.features.keys().cloned().collect::<Vec<_>>() {
            if let Some(value) = store.get_bool(&key) {
                app.features.insert(key, value);
            }
        }
        if let Some(theme) = store.get(settings::KEY_THEME) {
            app.state.appearance.current_theme = theme.to_string();
        }
        if let Some(layout) = store.get(settings::KEY_LAYOUT) {
            app.state.appearance.current_layout = layout.to_string();
        }
        app
    }

    pub fn feature(&self, key: &str) -> bool {
        self.features.get(key).copied().unwrap_or(false)
    }

    /// Dispatch a command. Public commands pass the permission gate or
    /// become silent no-ops; private ones always run. The top-level
    /// invocation of a (possibly re-entrant) dispatch emits one render
    /// signal.
    pub fn run(&mut self, command: CommandId) {
        if !command.is_private() && !gate::command_allowed(&self.state, &command) {
            tracing::debug!(command = command.name(), "command denied");
            return;
        }
        tracing::trace!(command = command.name(), "dispatch");
        let is_public = !command.is_private();
        self.depth += 1;
        self.execute(command);
        self.depth -= 1;
        if self.depth == 0 {
            if is_public && self.suppress_next_render {
                self.suppress_next_render = false;
            } else {
                self.effects.push(Effect::Render);
            }
        }
    }

    /// Swallow the render signal of the next executed public command
    /// (input surfaces that already painted the keystroke themselves).
    pub fn suppress_next_render(&mut self) {
        self.suppress_next_render = true;
    }

    /// Drain the accumulated side effects for the I/O layer to perform.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn connection_opened(&mut self) {
        self.state.is_connected = true;
        self.state.has_established_connection = true;
        self.run(CommandId::Init);
    }

    pub fn connection_lost(&mut self) {
        self.state.is_connected = false;
        self.effects.push(Effect::Render);
    }

    /// Router-decorate and queue an outbound message.
    pub(crate) fn send(&mut self, mut message: Outbound) {
        self.state.routing.decorate(&mut message);
        self.effects.push(Effect::Send(message));
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tab::Tab;
    use pretty_assertions::assert_eq;

    fn connected_app() -> App {
        let mut app = App::new();
        app.state.is_connected = true;
        app.state.is_authenticated = true;
        app.state.tabs.push(Tab {
            key: "containers".into(),
            ..Tab::default()
        });
        app.state.navigation.current_tab = Some("containers".into());
        app.take_effects();
        app
    }

    #[test]
    fn test_denied_command_emits_nothing() {
        let mut app = connected_app();
        app.state.is_loading = true;
        app.run(CommandId::Remove);
        assert!(app.take_effects().is_empty());
    }

    #[test]
    fn test_executed_command_emits_one_render() {
        let mut app = connected_app();
        app.run(CommandId::ScrollDown);
        let renders = app
            .take_effects()
            .iter()
            .filter(|e| matches!(e, Effect::Render))
            .count();
        assert_eq!(renders, 1);
    }

    #[test]
    fn test_suppress_consumed_by_next_public_command() {
        let mut app = connected_app();
        app.suppress_next_render();
        app.run(CommandId::ScrollDown);
        assert!(!app.take_effects().contains(&Effect::Render));

        app.run(CommandId::ScrollDown);
        assert!(app.take_effects().contains(&Effect::Render));
    }

    #[test]
    fn test_private_command_does_not_consume_suppression() {
        let mut app = connected_app();
        app.suppress_next_render();
        app.run(CommandId::Render);
        // Private top-level dispatches still render
        assert!(app.take_effects().contains(&Effect::Render));

        app.run(CommandId::ScrollUp);
        assert!(!app.take_effects().contains(&Effect::Render));
    }

    #[test]
    fn test_connection_open_initializes() {
        let mut app = App::new();
        app.connection_opened();
        assert!(app.state.is_connected);
        assert!(app.state.has_established_connection);
        assert!(app
            .take_effects()
            .iter()
            .any(|e| matches!(e, Effect::Send(m) if m.action == "init")));
    }

    #[test]
    fn test_routing_decoration_applies_on_send() {
        let mut app = connected_app();
        app.state.routing.current_host = Some("h1".into());
        app.send(Outbound::new("init"));
        assert!(app.take_effects().iter().any(|e| matches!(
            e,
            Effect::Send(m) if m.action == "init" && m.host.as_deref() == Some("h1")
        )));
    }
}
