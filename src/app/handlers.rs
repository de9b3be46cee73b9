// Command handlers - the dispatch table behind App::run

use crate::command::{CommandId, Effect, TimerKey, DELAY_JUMP_DEBOUNCE};
use crate::protocol::Outbound;
use crate::settings;
use crate::state::jump::JumpBacklog;
use crate::state::popup::{
    Helper, InputAction, MenuAction, MenuKind, PendingAction, PopupKind, PromptInputSpec,
    PromptSpec,
};
use crate::state::search::SearchTarget;
use crate::state::tab::singular;

use super::App;

impl App {
    pub(super) fn execute(&mut self, command: CommandId) {
        use CommandId::*;
        match command {
            // Navigation
            ScrollUp => self.scroll_rows(-1),
            ScrollDown => self.scroll_rows(1),
            ScrollLeft => {
                if self.state.inspector.is_enabled {
                    let scroll = &mut self.state.inspector.horizontal_scroll;
                    *scroll = (*scroll - 1).max(0);
                } else {
                    self.run(PreviousTab);
                }
            }
            ScrollRight => {
                if self.state.inspector.is_enabled {
                    self.state.inspector.horizontal_scroll += 1;
                } else {
                    self.run(NextTab);
                }
            }
            NextTab => self.shift_tab(1),
            PreviousTab => self.shift_tab(-1),
            NextSubTab => self.shift_sub_tab(1),
            PreviousSubTab => self.shift_sub_tab(-1),
            GoToTab(index) => self.go_to_tab(index),

            // Interaction
            Confirm => self.confirm(),
            Reject => self.reject(),
            Quit => self.quit(),
            Help => self.run(ShowPopup(PopupKind::Help)),
            Menu => self.open_resource_menu(),
            Bulk => self.open_bulk_menu(),
            Prompt(spec) => self.run(ShowPrompt(spec)),
            Message(message) => self.show_message(message),

            // Resource shortcuts
            Remove => {
                self.prompt_row_action("remove", "Are you sure you want to remove this resource?")
            }
            Pause => {
                if self.tab_is("containers") {
                    self.send_row_action("pause");
                }
            }
            Stop => {
                if self.tab_is("containers") {
                    self.prompt_row_action("stop", "Are you sure you want to stop this container?");
                }
            }
            RunRestart => self.run_or_restart(),
            Rename => self.rename_container(),
            ShellContainer => {
                if self.tab_is("containers") {
                    self.send_row_action("shell");
                }
            }
            ShellSystem => self.send(Outbound::new("shell")),
            Browser => {
                if self.tab_is("containers") {
                    self.send_row_action("browser");
                }
            }
            Hub => self.open_hub(),
            Pull => self.pull_image(),
            Browse => {
                if self.tab_is("volumes") {
                    self.send_row_action("browse");
                }
            }
            Reload => {
                if self.state.inspector.is_enabled {
                    self.run(RefreshInspector);
                } else {
                    self.run(Init);
                }
            }
            Project => self.open_project(),

            // Modal surfaces
            Overview => {
                self.send(Outbound::new("overview"));
                self.run(ShowPopup(PopupKind::Overview));
            }
            Jump => self.open_jump(),
            Search => self.open_search(),
            Parameters => {
                self.rebuild_parameter_actions();
                self.run(ShowPopup(PopupKind::Menu(MenuKind::Parameters)));
            }
            ThemePicker => self.open_theme_picker(),
            AgentPicker => self.open_agent_picker(),
            HostPicker => self.open_host_picker(),

            // Routing
            NextAgent => {
                if !self.state.routing.available_agents.is_empty() {
                    let next = self.state.routing.next_agent();
                    self.run(AgentSwitch(next));
                }
            }
            PreviousAgent => {
                if !self.state.routing.available_agents.is_empty() {
                    let previous = self.state.routing.previous_agent();
                    self.run(AgentSwitch(previous));
                }
            }
            NextHost => {
                if let Some(host) = self.state.routing.next_host() {
                    self.run(HostSwitch(host));
                }
            }
            PreviousHost => {
                if let Some(host) = self.state.routing.previous_host() {
                    self.run(HostSwitch(host));
                }
            }

            // Appearance
            NextLayout => self.cycle_layout(1),
            PreviousLayout => self.cycle_layout(-1),
            TtyQuit => self.run(TtyQuitSession),

            // Private primitives
            Render => {}
            Init => self.send(Outbound::new("init")),
            Exit => {
                self.state.is_authenticated = false;
                self.send(Outbound::new("auth.logout"));
                self.effects.push(Effect::Exit);
            }
            ShowPrompt(spec) => self.show_prompt(spec),
            ClearPrompt => {
                self.state.prompt.clear();
                if self.state.popup == Some(PopupKind::Prompt) {
                    self.run(ClearPopup);
                }
            }
            ShowPopup(kind) => self.show_popup(kind),
            ClearPopup => self.clear_popup(),
            ClearMessage => {
                self.state.message.clear();
                if self.state.popup == Some(PopupKind::Message) {
                    self.run(ClearPopup);
                } else {
                    self.state.helper = Helper::Default;
                }
            }
            EnterInspect => self.enter_inspect(),
            ExitInspect => self.exit_inspect(),
            WsSend(message) => self.send(message),
            InspectorTabs => self.request_inspector_tabs(),
            RefreshInspector => self.refresh_inspector(),
            ShowAuthentication => self.show_authentication(),
            Authenticate => self.authenticate(),
            AuthExpireError => {
                self.run(ClearMessage);
                self.run(ShowAuthentication);
            }
            AuthExpireSuccess => {
                self.run(ClearMessage);
                self.state.is_authenticated = true;
                if self.feature(settings::FEATURE_LAUNCH_OVERVIEW) {
                    self.run(Overview);
                } else {
                    self.run(Init);
                }
            }
            PromptInput(value) => self.state.prompt.input_value = value,
            SearchQuery(query) => {
                if self.state.search.is_enabled {
                    self.state.search.query = query;
                    self.apply_search_filter();
                }
            }
            JumpQuery(query) => {
                if self.state.jump.is_enabled {
                    self.state.jump.query = query;
                    self.effects.push(Effect::Schedule {
                        key: TimerKey::JumpDebounce,
                        delay: DELAY_JUMP_DEBOUNCE,
                        command: JumpApply,
                    });
                }
            }
            JumpApply => self.jump_apply(),
            TtyExec(command_line) => self.tty_exec(command_line),
            TtyClear => self.state.tty.clear_screen(),
            TtyErase => self.state.tty.draft.clear(),
            TtyDraft(text) => {
                self.state.tty.draft = text;
                // Typing deselects any recalled history entry
                self.state.tty.history_cursor = self.state.tty.history.len() as isize;
            }
            TtyHistoryPrevious => self.state.tty.history_previous(),
            TtyHistoryNext => self.state.tty.history_next(),
            TtyFlush => {
                self.state.tty.idle_flush();
            }
            TtyQuitSession => self.quit_tty_session(),
            ImagePull(image) => self.send(Outbound::new("image.pull").with_arg("Image", &image)),
            ImageRun(name) => self.image_run(name),
            ContainerRename(name) => self.container_rename(name),
            AgentSwitch(target) => self.agent_switch(target),
            HostSwitch(host) => {
                self.state.routing.current_host = Some(host);
                self.run(Init);
            }
            ThemeSet(theme) => {
                self.state.appearance.current_theme = theme.clone();
                self.effects.push(Effect::Persist {
                    key: settings::KEY_THEME.into(),
                    value: theme,
                });
            }
            ParameterToggle(key) => self.toggle_parameter(key),
        }
    }

    // ─── Navigation ──────────────────────────────────────────────────

    fn scroll_rows(&mut self, step: i64) {
        if self.state.is_menuing() {
            let count = self.menu_row_count();
            if count == 0 {
                return;
            }
            let current = self.state.navigation.current_menu_row.unwrap_or(1) as i64;
            let next = (current - 1 + step).rem_euclid(count as i64) as usize + 1;
            self.state.navigation.current_menu_row = Some(next);
            return;
        }
        if self.state.inspector.is_enabled {
            let scroll = &mut self.state.inspector.vertical_scroll;
            *scroll = (*scroll + step as i32).max(0);
            return;
        }
        let Some(tab) = self.state.current_tab() else {
            return;
        };
        let key = tab.key.clone();
        let len = tab.rows.len();
        if len == 0 {
            return;
        }
        let current = self.state.row_cursor(&key) as i64;
        let next = (current - 1 + step).rem_euclid(len as i64) as usize + 1;
        self.state.navigation.current_tabs_rows.insert(key, next);
        // The focused resource changed: re-fetch its inspector surface
        self.run(CommandId::InspectorTabs);
    }

    fn menu_row_count(&self) -> usize {
        match self.state.popup {
            Some(PopupKind::Jump) => self.state.jump.results.len().max(1),
            Some(PopupKind::Overview) => self.state.overview.instances.len() + 1,
            _ => self.state.menu.row_count(),
        }
    }

    fn shift_tab(&mut self, step: i64) {
        if self.state.inspector.is_enabled {
            self.run(CommandId::ExitInspect);
        }
        if self.state.tabs.is_empty() {
            return;
        }
        let keys: Vec<String> = self.state.tabs.iter().map(|t| t.key.clone()).collect();
        let index = self
            .state
            .current_tab_key()
            .and_then(|current| keys.iter().position(|k| k == current))
            .unwrap_or(0) as i64;
        let next = (index + step).rem_euclid(keys.len() as i64) as usize;
        self.state.navigation.current_tab = Some(keys[next].clone());
        self.run(CommandId::InspectorTabs);
    }

    fn shift_sub_tab(&mut self, step: i64) {
        let tabs = self.state.inspector.available_tabs.clone();
        if tabs.is_empty() {
            return;
        }
        let index = self
            .state
            .inspector
            .current_tab
            .as_ref()
            .and_then(|current| tabs.iter().position(|t| t == current))
            .unwrap_or(0) as i64;
        let next = (index + step).rem_euclid(tabs.len() as i64) as usize;
        self.state.inspector.current_tab = Some(tabs[next].clone());
        self.run(CommandId::RefreshInspector);
    }

    fn go_to_tab(&mut self, index: usize) {
        let Some(tab) = self.state.tabs.get(index) else {
            return;
        };
        let key = tab.key.clone();
        if self.state.inspector.is_enabled {
            self.run(CommandId::ExitInspect);
        }
        self.state.navigation.current_tab = Some(key);
        self.run(CommandId::InspectorTabs);
    }

    // ─── Confirm / reject / quit cascades ────────────────────────────

    fn confirm(&mut self) {
        if self.state.prompt.is_enabled {
            let value = self.state.prompt.input_value.clone();
            let pending = self.state.prompt.on_confirm.take();
            match pending {
                Some(PendingAction::SendMessage(message)) => self.send(message),
                Some(PendingAction::SendMessageWithInput { message, field }) => {
                    if !value.is_empty() {
                        let message = message.with_arg(&field, &value);
                        self.send(message);
                    }
                }
                Some(PendingAction::Invoke(command)) => self.run(*command),
                Some(PendingAction::WithInput(input)) => self.confirm_input(input, value),
                None => {}
            }
            self.run(CommandId::ClearPrompt);
            return;
        }
        if self.state.message.is_enabled {
            self.run(CommandId::ClearMessage);
            return;
        }
        if self.state.is_menuing() {
            self.confirm_menu_row();
            return;
        }
        if self.state.search.is_enabled && self.state.search.is_pending {
            self.commit_search();
            return;
        }
        if self.state.popup.is_some() {
            self.run(CommandId::ClearPopup);
            return;
        }
        self.run(CommandId::EnterInspect);
    }

    fn confirm_input(&mut self, input: InputAction, value: String) {
        match input {
            // Reads the typed password off the still-open prompt
            InputAction::Authenticate => self.run(CommandId::Authenticate),
            InputAction::PullImage => {
                if !value.is_empty() {
                    self.run(CommandId::ImagePull(value));
                }
            }
            // An empty name is legal: the server picks one
            InputAction::RunImage => self.run(CommandId::ImageRun(value)),
            InputAction::RenameContainer => {
                if !value.is_empty() {
                    self.run(CommandId::ContainerRename(value));
                }
            }
        }
    }

    fn confirm_menu_row(&mut self) {
        let row = self.state.navigation.current_menu_row.unwrap_or(1);
        let Some(popup) = self.state.popup else {
            return;
        };
        match popup {
            PopupKind::Jump => self.confirm_jump(row),
            PopupKind::Overview => self.run(CommandId::ClearPopup),
            PopupKind::Menu(kind) => {
                let Some(action) = self.state.menu.actions.get(row.saturating_sub(1)).cloned()
                else {
                    // The synthetic trailing cancel row
                    self.run(CommandId::ClearPopup);
                    return;
                };
                match kind {
                    MenuKind::Theme => {
                        self.run(CommandId::ClearPopup);
                        self.run(CommandId::ThemeSet(action.command));
                    }
                    MenuKind::Agent => {
                        let target = (!action.command.is_empty()).then_some(action.command);
                        self.run(CommandId::ClearPopup);
                        self.run(CommandId::AgentSwitch(target));
                    }
                    MenuKind::Host => {
                        self.run(CommandId::ClearPopup);
                        self.run(CommandId::HostSwitch(action.command));
                    }
                    MenuKind::Parameters => self.run(CommandId::ParameterToggle(action.command)),
                    MenuKind::Menu | MenuKind::Bulk => self.execute_menu_action(action),
                }
            }
            _ => self.run(CommandId::ClearPopup),
        }
    }

    fn execute_menu_action(&mut self, action: MenuAction) {
        if action.run_locally {
            self.run(CommandId::ClearPopup);
            if let Some(command) = CommandId::from_name(&action.command) {
                self.run(command);
            }
            return;
        }
        let mut message = Outbound::new(action.command);
        if action.requires_resource {
            let Some(row) = self.state.current_row().cloned() else {
                self.run(CommandId::ClearPopup);
                return;
            };
            message = message.with_resource(&row);
        }
        if let Some(text) = action.prompt {
            self.run(CommandId::ClearPopup);
            self.run(CommandId::Prompt(PromptSpec {
                text: Some(text),
                input: None,
                on_confirm: PendingAction::SendMessage(message),
                is_for_authentication: false,
            }));
            return;
        }
        if let Some(field) = action.prompt_input {
            self.run(CommandId::ClearPopup);
            self.run(CommandId::Prompt(PromptSpec {
                text: None,
                input: Some(PromptInputSpec {
                    name: field.clone(),
                    placeholder: field.clone(),
                    is_secret: false,
                }),
                on_confirm: PendingAction::SendMessageWithInput { message, field },
                is_for_authentication: false,
            }));
            return;
        }
        self.send(message);
        self.run(CommandId::ClearPopup);
    }

    fn confirm_jump(&mut self, row: usize) {
        let Some(result) = self.state.jump.results.get(row.saturating_sub(1)).cloned() else {
            self.run(CommandId::ClearPopup);
            return;
        };
        match result.host {
            Some(host) if self.state.routing.current_host.as_deref() != Some(host.as_str()) => {
                // Remembered until the post-switch init arrives
                self.state.jump.backlog = Some(JumpBacklog {
                    tab_key: result.tab_key,
                    identity: result.identity,
                });
                self.run(CommandId::ClearPopup);
                self.run(CommandId::HostSwitch(host));
            }
            _ => {
                self.run(CommandId::ClearPopup);
                self.state.navigation.current_tab = Some(result.tab_key.clone());
                self.focus_row(&result.tab_key, result.identity.as_deref());
                self.run(CommandId::InspectorTabs);
            }
        }
    }

    pub(super) fn focus_row(&mut self, tab_key: &str, identity: Option<&str>) {
        let Some(tab) = self.state.tab(tab_key) else {
            return;
        };
        let position =
            identity.and_then(|id| tab.rows.iter().position(|r| r.identity() == Some(id)));
        let cursor = position.map(|p| p + 1).unwrap_or(1);
        self.state
            .navigation
            .current_tabs_rows
            .insert(tab_key.to_string(), cursor);
    }

    fn reject(&mut self) {
        if self.state.prompt.is_enabled {
            self.run(CommandId::ClearPrompt);
            return;
        }
        if self.state.message.is_enabled {
            self.run(CommandId::ClearMessage);
            return;
        }
        if self.state.search.is_enabled {
            self.restore_search_target();
            self.state.search.clear();
            if self.state.popup == Some(PopupKind::Search) {
                self.run(CommandId::ClearPopup);
            }
            return;
        }
        if self.state.popup.is_some() {
            self.run(CommandId::ClearPopup);
            return;
        }
        if self.state.inspector.is_enabled {
            self.run(CommandId::ExitInspect);
        }
    }

    fn quit(&mut self) {
        if self.state.prompt.is_enabled {
            self.run(CommandId::ClearPrompt);
        } else if self.state.message.is_enabled {
            self.run(CommandId::ClearMessage);
        } else if self.state.popup == Some(PopupKind::Tty) {
            self.run(CommandId::TtyQuitSession);
        } else if self.state.popup.is_some() {
            self.run(CommandId::ClearPopup);
        } else {
            self.run(CommandId::Prompt(PromptSpec {
                text: Some("Are you sure you want to quit?".into()),
                input: None,
                on_confirm: PendingAction::Invoke(Box::new(CommandId::Exit)),
                is_for_authentication: false,
            }));
        }
    }

    // ─── Popups and prompts ──────────────────────────────────────────

    fn show_prompt(&mut self, spec: PromptSpec) {
        self.state.helper = if spec.input.is_some() {
            Helper::PromptInput
        } else {
            Helper::Prompt
        };
        self.state.prompt.open(spec);
        self.run(CommandId::ShowPopup(PopupKind::Prompt));
    }

    fn show_popup(&mut self, kind: PopupKind) {
        self.state.suspend_focus();
        self.state.popup = Some(kind);
        if kind.is_menu_family() {
            self.state.navigation.current_menu_row = Some(1);
            self.state.helper = Helper::Menu;
        } else if matches!(kind, PopupKind::Message | PopupKind::Help) {
            self.state.helper = Helper::Message;
        }
    }

    fn clear_popup(&mut self) {
        let Some(kind) = self.state.popup.take() else {
            return;
        };
        if kind == PopupKind::Jump {
            self.state.jump.close();
            self.effects.push(Effect::Cancel(TimerKey::JumpDebounce));
        }
        self.state.menu.actions.clear();
        self.state.helper = Helper::Default;
        self.state.restore_focus();
    }

    pub(super) fn show_message(&mut self, message: crate::state::popup::Message) {
        self.state.message = message;
        self.state.message.is_enabled = true;
        self.run(CommandId::ShowPopup(PopupKind::Message));
    }

    // ─── Inspector ───────────────────────────────────────────────────

    fn enter_inspect(&mut self) {
        if self.state.current_row().is_none() {
            return;
        }
        self.state.inspector.is_enabled = true;
        self.state.navigation.previous_tab = self.state.navigation.current_tab.take();
        if self.state.inspector.available_tabs.is_empty() {
            self.run(CommandId::InspectorTabs);
        } else if self.state.inspector.content.is_empty() {
            self.run(CommandId::RefreshInspector);
        }
    }

    fn exit_inspect(&mut self) {
        self.state.inspector.is_enabled = false;
        if self.state.navigation.current_tab.is_none() {
            self.state.navigation.current_tab = self.state.navigation.previous_tab.take();
        }
    }

    fn request_inspector_tabs(&mut self) {
        let Some(key) = self.state.current_tab_key().map(str::to_string) else {
            return;
        };
        let Some(row) = self.state.current_row().cloned() else {
            return;
        };
        self.send(Outbound::new(format!("{}.inspect.tabs", singular(&key))).with_resource(&row));
    }

    fn refresh_inspector(&mut self) {
        let Some(sub_tab) = self.state.inspector.current_tab.clone() else {
            return;
        };
        let Some(key) = self.state.current_tab_key().map(str::to_string) else {
            return;
        };
        let Some(row) = self.state.current_row().cloned() else {
            return;
        };
        self.state.inspector.reset_content();
        self.send(
            Outbound::new(format!(
                "{}.inspect.{}",
                singular(&key),
                sub_tab.to_lowercase()
            ))
            .with_resource(&row),
        );
    }

    // ─── Authentication ──────────────────────────────────────────────

    fn show_authentication(&mut self) {
        self.run(CommandId::ShowPrompt(PromptSpec {
            text: None,
            input: Some(PromptInputSpec {
                name: "password".into(),
                placeholder: "Password".into(),
                is_secret: true,
            }),
            on_confirm: PendingAction::WithInput(InputAction::Authenticate),
            is_for_authentication: true,
        }));
    }

    fn authenticate(&mut self) {
        let password = self.state.prompt.input_value.clone();
        if password.is_empty() {
            return;
        }
        self.send(Outbound::new("auth.login").with_arg("Password", &password));
    }

    // ─── Search ──────────────────────────────────────────────────────

    fn open_search(&mut self) {
        if self.state.inspector.is_enabled && self.state.inspector.is_streaming_lines() {
            let lines = self.state.inspector.all_lines();
            self.state.search.activate_on_lines(lines);
        } else {
            let Some(rows) = self.state.current_tab().map(|t| t.rows.clone()) else {
                return;
            };
            self.state.search.activate_on_rows(rows);
        }
        self.run(CommandId::ShowPopup(PopupKind::Search));
    }

    pub(super) fn apply_search_filter(&mut self) {
        match self.state.search.started_on {
            Some(SearchTarget::Resource) => {
                let rows = self.state.search.filtered_rows();
                let Some(key) = self.state.current_tab_key().map(str::to_string) else {
                    return;
                };
                if let Some(tab) = self.state.tab_mut(&key) {
                    tab.rows = rows;
                }
            }
            Some(SearchTarget::Logs) => {
                let lines = self.state.search.filtered_lines();
                self.state.inspector.set_lines(lines);
            }
            None => {}
        }
    }

    fn restore_search_target(&mut self) {
        match self.state.search.started_on {
            Some(SearchTarget::Resource) => {
                let rows = self.state.search.previous_rows.clone();
                let Some(key) = self.state.current_tab_key().map(str::to_string) else {
                    return;
                };
                if let Some(tab) = self.state.tab_mut(&key) {
                    tab.rows = rows;
                }
            }
            Some(SearchTarget::Logs) => {
                let lines = self.state.search.previous_lines.clone();
                self.state.inspector.set_lines(lines);
            }
            None => {}
        }
    }

    fn commit_search(&mut self) {
        // The filter is locked in; the filtered view takes focus and a
        // refresh restricted to it keeps the committed set current
        self.state.search.is_pending = false;
        match self.state.search.started_on {
            Some(SearchTarget::Resource) => {
                if let Some(key) = self.state.current_tab_key().map(str::to_string) {
                    let identities: Vec<String> = self
                        .state
                        .search
                        .filtered_rows()
                        .iter()
                        .filter_map(|r| r.identity().map(String::from))
                        .collect();
                    self.send(
                        Outbound::new(format!("{key}.refresh")).with_arg("Resources", identities),
                    );
                }
            }
            Some(SearchTarget::Logs) => self.run(CommandId::RefreshInspector),
            None => {}
        }
        if self.state.popup == Some(PopupKind::Search) {
            self.run(CommandId::ClearPopup);
        }
    }

    // ─── Jump ────────────────────────────────────────────────────────

    fn open_jump(&mut self) {
        self.state.jump.open();
        let current = self.state.routing.current_host.clone();
        let remote_hosts: Vec<String> = self
            .state
            .routing
            .available_hosts
            .iter()
            .filter(|h| current.as_deref() != Some(h.as_str()))
            .cloned()
            .collect();
        for host in remote_hosts {
            self.send(Outbound::new("resources.enumerate").undecorated().to_host(&host));
        }
        self.run(CommandId::ShowPopup(PopupKind::Jump));
        self.run(CommandId::JumpApply);
    }

    pub(super) fn jump_apply(&mut self) {
        if !self.state.jump.is_enabled {
            return;
        }
        let fuzzy = self.feature(settings::FEATURE_JUMP_FUZZY);
        self.state.jump.recompute(&self.state.tabs, fuzzy);
        self.state.navigation.current_menu_row = Some(1);
    }

    // ─── Menus and pickers ───────────────────────────────────────────

    fn open_resource_menu(&mut self) {
        let Some(key) = self.state.current_tab_key().map(str::to_string) else {
            return;
        };
        let Some(row) = self.state.current_row().cloned() else {
            return;
        };
        // The popup opens once the server answers with the action list
        self.send(Outbound::new(format!("{}.menu", singular(&key))).with_resource(&row));
    }

    fn open_bulk_menu(&mut self) {
        let Some(key) = self.state.current_tab_key().map(str::to_string) else {
            return;
        };
        self.send(Outbound::new(format!("{key}.bulk")));
        self.run(CommandId::ShowPopup(PopupKind::Menu(MenuKind::Bulk)));
    }

    fn open_theme_picker(&mut self) {
        self.state.menu.actions = self
            .state
            .appearance
            .available_themes
            .iter()
            .map(|theme| MenuAction {
                command: theme.clone(),
                label: theme.clone(),
                ..MenuAction::default()
            })
            .collect();
        self.run(CommandId::ShowPopup(PopupKind::Menu(MenuKind::Theme)));
    }

    fn open_agent_picker(&mut self) {
        let mut actions = vec![MenuAction {
            command: String::new(),
            label: "master".into(),
            ..MenuAction::default()
        }];
        actions.extend(self.state.routing.available_agents.iter().map(|agent| {
            MenuAction {
                command: agent.clone(),
                label: agent.clone(),
                ..MenuAction::default()
            }
        }));
        self.state.menu.actions = actions;
        self.run(CommandId::ShowPopup(PopupKind::Menu(MenuKind::Agent)));
    }

    fn open_host_picker(&mut self) {
        self.state.menu.actions = self
            .state
            .routing
            .available_hosts
            .iter()
            .map(|host| MenuAction {
                command: host.clone(),
                label: host.clone(),
                ..MenuAction::default()
            })
            .collect();
        self.run(CommandId::ShowPopup(PopupKind::Menu(MenuKind::Host)));
    }

    fn rebuild_parameter_actions(&mut self) {
        let mut keys: Vec<String> = self.features.keys().cloned().collect();
        keys.sort();
        let actions = keys
            .into_iter()
            .map(|key| {
                let enabled = self.feature(&key);
                MenuAction {
                    label: format!("[{}] {key}", if enabled { "x" } else { " " }),
                    command: key,
                    ..MenuAction::default()
                }
            })
            .collect();
        self.state.menu.actions = actions;
    }

    fn toggle_parameter(&mut self, key: String) {
        let flipped = !self.feature(&key);
        self.features.insert(key.clone(), flipped);
        self.effects.push(Effect::Persist {
            key,
            value: flipped.to_string(),
        });
        self.rebuild_parameter_actions();
    }

    // ─── Routing and appearance ──────────────────────────────────────

    fn agent_switch(&mut self, target: Option<String>) {
        // Tell the previous target to drop any open stream before the
        // console re-initializes against the new one
        let farewell = match &self.state.routing.current_agent {
            Some(previous) => Outbound::new("stream.close").undecorated().to_agent(previous),
            None => Outbound::new("stream.close").undecorated(),
        };
        self.send(farewell);
        self.state.routing.current_agent = target;
        self.run(CommandId::Init);
    }

    fn cycle_layout(&mut self, step: i64) {
        let layouts = self.state.appearance.available_layouts.clone();
        if layouts.is_empty() {
            return;
        }
        let index = layouts
            .iter()
            .position(|l| *l == self.state.appearance.current_layout)
            .unwrap_or(0) as i64;
        let next = (index + step).rem_euclid(layouts.len() as i64) as usize;
        self.state.appearance.current_layout = layouts[next].clone();
        self.effects.push(Effect::Persist {
            key: settings::KEY_LAYOUT.into(),
            value: layouts[next].clone(),
        });
    }

    // ─── Resource shortcuts ──────────────────────────────────────────

    fn tab_is(&self, key: &str) -> bool {
        self.state.current_tab_key() == Some(key)
    }

    fn send_row_action(&mut self, suffix: &str) {
        let Some(key) = self.state.current_tab_key().map(str::to_string) else {
            return;
        };
        let Some(row) = self.state.current_row().cloned() else {
            return;
        };
        self.send(Outbound::new(format!("{}.{}", singular(&key), suffix)).with_resource(&row));
    }

    fn prompt_row_action(&mut self, suffix: &str, text: &str) {
        let Some(key) = self.state.current_tab_key().map(str::to_string) else {
            return;
        };
        let Some(row) = self.state.current_row().cloned() else {
            return;
        };
        let message =
            Outbound::new(format!("{}.{}", singular(&key), suffix)).with_resource(&row);
        self.run(CommandId::Prompt(PromptSpec {
            text: Some(text.to_string()),
            input: None,
            on_confirm: PendingAction::SendMessage(message),
            is_for_authentication: false,
        }));
    }

    fn run_or_restart(&mut self) {
        if self.tab_is("containers") {
            self.prompt_row_action(
                "restart",
                "Are you sure you want to restart this container?",
            );
        } else if self.tab_is("images") {
            self.run(CommandId::Prompt(PromptSpec {
                text: None,
                input: Some(PromptInputSpec {
                    name: "Name".into(),
                    placeholder: "Container name (optional)".into(),
                    is_secret: false,
                }),
                on_confirm: PendingAction::WithInput(InputAction::RunImage),
                is_for_authentication: false,
            }));
        }
    }

    fn rename_container(&mut self) {
        if !self.tab_is("containers") {
            return;
        }
        self.run(CommandId::Prompt(PromptSpec {
            text: None,
            input: Some(PromptInputSpec {
                name: "Name".into(),
                placeholder: "New name".into(),
                is_secret: false,
            }),
            on_confirm: PendingAction::WithInput(InputAction::RenameContainer),
            is_for_authentication: false,
        }));
    }

    fn pull_image(&mut self) {
        if !self.tab_is("images") {
            return;
        }
        self.run(CommandId::Prompt(PromptSpec {
            text: None,
            input: Some(PromptInputSpec {
                name: "Image".into(),
                placeholder: "name:tag".into(),
                is_secret: false,
            }),
            on_confirm: PendingAction::WithInput(InputAction::PullImage),
            is_for_authentication: false,
        }));
    }

    fn open_hub(&mut self) {
        if !self.tab_is("images") {
            return;
        }
        let Some(row) = self.state.current_row() else {
            return;
        };
        let Some(name) = row.name.as_deref().or(row.field_value("Name")) else {
            return;
        };
        let repository = name.split(':').next().unwrap_or(name);
        let url = if repository.contains('/') {
            format!("https://hub.docker.com/r/{repository}")
        } else {
            format!("https://hub.docker.com/_/{repository}")
        };
        self.effects.push(Effect::OpenExternal(url));
    }

    fn open_project(&mut self) {
        let Some(row) = self.state.current_row() else {
            return;
        };
        let Some(url) = row.field_value("Project").map(str::to_string) else {
            return;
        };
        self.effects.push(Effect::OpenExternal(url));
    }

    // ─── TTY and image/container operations ──────────────────────────

    fn tty_exec(&mut self, command_line: String) {
        if !self.state.tty.is_enabled || command_line.is_empty() {
            return;
        }
        self.state.tty.record_command(&command_line);
        self.send(Outbound::new("shell.command").with_arg("Command", &command_line));
    }

    fn quit_tty_session(&mut self) {
        if self.state.tty.is_enabled {
            self.send(Outbound::new("shell.quit"));
        }
        self.state.tty.quit();
        if self.state.popup == Some(PopupKind::Tty) {
            self.run(CommandId::ClearPopup);
        }
    }

    fn image_run(&mut self, name: String) {
        let Some(row) = self.state.current_row().cloned() else {
            return;
        };
        let mut message = Outbound::new("image.run").with_resource(&row);
        if !name.is_empty() {
            message = message.with_arg("Name", &name);
        }
        self.send(message);
    }

    fn container_rename(&mut self, name: String) {
        let Some(row) = self.state.current_row().cloned() else {
            return;
        };
        self.send(
            Outbound::new("container.rename")
                .with_resource(&row)
                .with_arg("Name", &name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tab::{Cell, Row, Tab};
    use pretty_assertions::assert_eq;

    fn named(name: &str) -> Row {
        Row {
            id: Some(format!("id-{name}")),
            name: Some(name.to_string()),
            cells: vec![Cell::Field {
                field: "Name".into(),
                value: name.into(),
                representation: None,
            }],
            ..Row::default()
        }
    }

    fn ready_app() -> App {
        let mut app = App::new();
        app.state.is_connected = true;
        app.state.is_authenticated = true;
        app.state.tabs = vec![
            Tab {
                key: "containers".into(),
                title: "Containers".into(),
                rows: vec![named("web"), named("db"), named("cache")],
                sort_spec: None,
            },
            Tab {
                key: "images".into(),
                title: "Images".into(),
                rows: vec![named("alpine")],
                sort_spec: None,
            },
        ];
        app.state.navigation.current_tab = Some("containers".into());
        app.take_effects();
        app
    }

    fn sent_actions(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(m) => Some(m.action.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_row_cursor_wraps_through_full_cycle() {
        let mut app = ready_app();
        for expected in [2, 3, 1] {
            app.run(CommandId::ScrollDown);
            assert_eq!(app.state.row_cursor("containers"), expected);
        }
        app.run(CommandId::ScrollUp);
        assert_eq!(app.state.row_cursor("containers"), 3);
    }

    #[test]
    fn test_row_change_requests_inspector_tabs() {
        let mut app = ready_app();
        app.run(CommandId::ScrollDown);
        assert!(sent_actions(&app.take_effects()).contains(&"container.inspect.tabs".to_string()));
    }

    #[test]
    fn test_tab_shift_wraps_and_requests_tabs() {
        let mut app = ready_app();
        app.run(CommandId::PreviousTab);
        assert_eq!(app.state.current_tab_key(), Some("images"));
        app.run(CommandId::NextTab);
        assert_eq!(app.state.current_tab_key(), Some("containers"));
    }

    #[test]
    fn test_zero_sub_tabs_is_a_silent_no_op() {
        let mut app = ready_app();
        app.run(CommandId::NextSubTab);
        assert_eq!(app.state.inspector.current_tab, None);
        assert!(sent_actions(&app.take_effects()).is_empty());
    }

    #[test]
    fn test_remove_prompts_then_sends_on_confirm() {
        let mut app = ready_app();
        app.run(CommandId::Remove);
        assert!(app.state.prompt.is_enabled);
        assert_eq!(app.state.popup, Some(PopupKind::Prompt));
        app.take_effects();

        app.run(CommandId::Confirm);
        assert!(!app.state.prompt.is_enabled);
        assert_eq!(app.state.popup, None);
        assert_eq!(sent_actions(&app.take_effects()), vec!["container.remove"]);
    }

    #[test]
    fn test_stop_outside_containers_tab_is_silent() {
        let mut app = ready_app();
        app.state.navigation.current_tab = Some("images".into());
        app.run(CommandId::Stop);
        assert!(!app.state.prompt.is_enabled);
        assert!(sent_actions(&app.take_effects()).is_empty());
    }

    #[test]
    fn test_menu_reject_restores_cursor_pair() {
        let mut app = ready_app();
        app.run(CommandId::ScrollDown);
        app.run(CommandId::Bulk);
        assert_eq!(app.state.popup, Some(PopupKind::Menu(MenuKind::Bulk)));
        assert_eq!(app.state.navigation.current_menu_row, Some(1));
        assert_eq!(app.state.navigation.current_tab, None);

        app.run(CommandId::Reject);
        assert_eq!(app.state.popup, None);
        assert_eq!(app.state.navigation.current_tab.as_deref(), Some("containers"));
        assert_eq!(app.state.row_cursor("containers"), 2);
    }

    #[test]
    fn test_menu_cursor_wraps_over_cancel_row() {
        let mut app = ready_app();
        app.run(CommandId::Bulk);
        app.state.menu.actions = vec![MenuAction::default(), MenuAction::default()];
        // 2 actions + cancel = 3 rows
        for expected in [2, 3, 1] {
            app.run(CommandId::ScrollDown);
            assert_eq!(app.state.navigation.current_menu_row, Some(expected));
        }
    }

    #[test]
    fn test_server_menu_action_with_prompt() {
        let mut app = ready_app();
        app.state.popup = Some(PopupKind::Menu(MenuKind::Menu));
        app.state.navigation.previous_tab = app.state.navigation.current_tab.take();
        app.state.navigation.current_menu_row = Some(1);
        app.state.menu.actions = vec![MenuAction {
            command: "container.remove".into(),
            prompt: Some("Really remove?".into()),
            requires_resource: true,
            ..MenuAction::default()
        }];
        app.take_effects();

        app.run(CommandId::Confirm);
        assert!(app.state.prompt.is_enabled);
        app.run(CommandId::Confirm);
        let actions = sent_actions(&app.take_effects());
        assert_eq!(actions, vec!["container.remove"]);
    }

    #[test]
    fn test_run_locally_menu_action_dispatches_by_name() {
        let mut app = ready_app();
        app.state.popup = Some(PopupKind::Menu(MenuKind::Menu));
        app.state.navigation.previous_tab = app.state.navigation.current_tab.take();
        app.state.navigation.current_menu_row = Some(1);
        app.state.menu.actions = vec![MenuAction {
            command: "reload".into(),
            run_locally: true,
            ..MenuAction::default()
        }];
        app.take_effects();

        app.run(CommandId::Confirm);
        assert_eq!(sent_actions(&app.take_effects()), vec!["init"]);
    }

    #[test]
    fn test_quit_cascade_dismisses_then_prompts() {
        let mut app = ready_app();
        app.run(CommandId::Help);
        app.run(CommandId::Quit);
        assert_eq!(app.state.popup, None);

        app.run(CommandId::Quit);
        assert!(app.state.prompt.is_enabled);
        app.take_effects();
        app.run(CommandId::Confirm);
        let effects = app.take_effects();
        assert!(effects.contains(&Effect::Exit));
        assert!(sent_actions(&effects).contains(&"auth.logout".to_string()));
    }

    #[test]
    fn test_theme_picker_confirm_persists() {
        let mut app = ready_app();
        app.run(CommandId::ThemePicker);
        app.run(CommandId::ScrollDown);
        app.take_effects();
        app.run(CommandId::Confirm);
        assert_eq!(app.state.appearance.current_theme, "dark");
        assert!(app.take_effects().iter().any(|e| matches!(
            e,
            Effect::Persist { key, value } if key == settings::KEY_THEME && value == "dark"
        )));
    }

    #[test]
    fn test_agent_cycle_announces_and_reinitializes() {
        let mut app = ready_app();
        app.state.routing.available_agents = vec!["a1".into(), "a2".into()];
        app.run(CommandId::NextAgent);
        assert_eq!(app.state.routing.current_agent.as_deref(), Some("a1"));
        let actions = sent_actions(&app.take_effects());
        assert_eq!(actions, vec!["stream.close", "init"]);

        app.run(CommandId::NextAgent);
        app.run(CommandId::NextAgent);
        assert_eq!(app.state.routing.current_agent, None);
    }

    #[test]
    fn test_host_switch_reinitializes() {
        let mut app = ready_app();
        app.state.routing.available_hosts = vec!["h1".into(), "h2".into()];
        app.run(CommandId::NextHost);
        // No current host: cycling starts from the first entry
        assert_eq!(app.state.routing.current_host.as_deref(), Some("h2"));
        assert_eq!(sent_actions(&app.take_effects()), vec!["init"]);
    }

    #[test]
    fn test_search_filters_and_reject_restores() {
        let mut app = ready_app();
        app.run(CommandId::Search);
        assert!(app.state.search.is_pending);
        app.run(CommandId::SearchQuery("we".into()));
        assert_eq!(app.state.tab("containers").unwrap().rows.len(), 1);

        app.run(CommandId::Reject);
        assert!(!app.state.search.is_enabled);
        assert_eq!(app.state.tab("containers").unwrap().rows.len(), 3);
        assert_eq!(app.state.popup, None);
    }

    #[test]
    fn test_search_commit_locks_filtered_view() {
        let mut app = ready_app();
        app.run(CommandId::Search);
        app.run(CommandId::SearchQuery("db".into()));
        app.run(CommandId::Confirm);
        assert!(app.state.search.is_enabled);
        assert!(!app.state.search.is_pending);
        assert_eq!(app.state.popup, None);
        assert_eq!(app.state.tab("containers").unwrap().rows.len(), 1);
    }

    #[test]
    fn test_search_commit_requests_refresh_of_filtered_set() {
        let mut app = ready_app();
        app.run(CommandId::Search);
        app.run(CommandId::SearchQuery("db".into()));
        app.take_effects();

        app.run(CommandId::Confirm);
        assert!(app.take_effects().iter().any(|e| matches!(
            e,
            Effect::Send(m) if m.action == "containers.refresh"
                && m.args.as_ref().is_some_and(|a| a["Resources"] == serde_json::json!(["id-db"]))
        )));
    }

    #[test]
    fn test_jump_query_schedules_debounced_recompute() {
        let mut app = ready_app();
        app.run(CommandId::Jump);
        app.take_effects();
        app.run(CommandId::JumpQuery("we".into()));
        assert!(app.take_effects().iter().any(|e| matches!(
            e,
            Effect::Schedule { key: TimerKey::JumpDebounce, command: CommandId::JumpApply, .. }
        )));
    }

    #[test]
    fn test_jump_local_selection_moves_cursor() {
        let mut app = ready_app();
        app.run(CommandId::Jump);
        app.run(CommandId::JumpQuery("db".into()));
        app.run(CommandId::JumpApply);
        assert_eq!(app.state.jump.results.len(), 1);

        app.run(CommandId::Confirm);
        assert_eq!(app.state.popup, None);
        assert_eq!(app.state.current_tab_key(), Some("containers"));
        assert_eq!(app.state.row_cursor("containers"), 2);
    }

    #[test]
    fn test_jump_remote_selection_switches_host_with_backlog() {
        let mut app = ready_app();
        app.state.routing.available_hosts = vec!["h1".into(), "h2".into()];
        app.state.routing.current_host = Some("h1".into());
        app.run(CommandId::Jump);
        app.state.jump.remote_resources.push(crate::state::jump::RemoteResource {
            host: "h2".into(),
            tab_key: "volumes".into(),
            row: named("data"),
        });
        app.run(CommandId::JumpQuery("data".into()));
        app.run(CommandId::JumpApply);
        app.take_effects();

        app.run(CommandId::Confirm);
        assert_eq!(app.state.routing.current_host.as_deref(), Some("h2"));
        let backlog = app.state.jump.backlog.clone().unwrap();
        assert_eq!(backlog.tab_key, "volumes");
        assert_eq!(backlog.identity.as_deref(), Some("id-data"));
        assert!(sent_actions(&app.take_effects()).contains(&"init".to_string()));
    }

    #[test]
    fn test_jump_broadcasts_enumeration_to_other_hosts() {
        let mut app = ready_app();
        app.state.routing.available_hosts = vec!["h1".into(), "h2".into(), "h3".into()];
        app.state.routing.current_host = Some("h1".into());
        app.run(CommandId::Jump);
        let effects = app.take_effects();
        let targets: Vec<Option<String>> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(m) if m.action == "resources.enumerate" => Some(m.host.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![Some("h2".into()), Some("h3".into())]);
    }

    #[test]
    fn test_parameter_toggle_flips_and_persists() {
        let mut app = ready_app();
        app.run(CommandId::Parameters);
        app.take_effects();
        app.run(CommandId::Confirm);
        // First (sorted) feature key flipped off its default
        let effects = app.take_effects();
        assert!(effects.iter().any(|e| matches!(e, Effect::Persist { .. })));
        // The parameters menu stays open for further toggles
        assert_eq!(app.state.popup, Some(PopupKind::Menu(MenuKind::Parameters)));
    }

    #[test]
    fn test_tty_draft_typing_deselects_history() {
        let mut app = ready_app();
        app.state.tty.start(Some("system".into()));
        app.state.tty.record_command("ls");
        app.run(CommandId::TtyHistoryPrevious);
        assert_eq!(app.state.tty.input_prefill(), "ls");

        app.run(CommandId::TtyDraft("ps".into()));
        assert_eq!(app.state.tty.input_prefill(), "ps");
    }

    #[test]
    fn test_tty_exec_records_and_sends() {
        let mut app = ready_app();
        app.state.tty.start(None);
        app.run(CommandId::TtyExec("uptime".into()));
        assert_eq!(app.state.tty.history, vec!["uptime"]);
        assert_eq!(sent_actions(&app.take_effects()), vec!["shell.command"]);
    }

    #[test]
    fn test_tty_quit_tears_down_session_and_popup() {
        let mut app = ready_app();
        app.state.tty.start(None);
        app.run(CommandId::ShowPopup(PopupKind::Tty));
        app.take_effects();
        app.run(CommandId::TtyQuit);
        assert!(!app.state.tty.is_enabled);
        assert_eq!(app.state.popup, None);
        assert_eq!(sent_actions(&app.take_effects()), vec!["shell.quit"]);
    }

    #[test]
    fn test_image_run_prompt_allows_empty_name() {
        let mut app = ready_app();
        app.state.navigation.current_tab = Some("images".into());
        app.run(CommandId::RunRestart);
        assert!(app.state.prompt.is_enabled);
        app.take_effects();
        app.run(CommandId::Confirm);
        let effects = app.take_effects();
        assert_eq!(sent_actions(&effects), vec!["image.run"]);
    }

    #[test]
    fn test_hub_opens_external_address() {
        let mut app = ready_app();
        app.state.navigation.current_tab = Some("images".into());
        app.run(CommandId::Hub);
        assert!(app.take_effects().iter().any(|e| matches!(
            e,
            Effect::OpenExternal(url) if url == "https://hub.docker.com/_/alpine"
        )));
    }
}
