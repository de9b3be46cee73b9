// Notification handlers - asynchronous server messages applied in
// arrival order against the state store

use crate::command::{
    CommandId, Effect, TimerKey, DELAY_AUTH_MESSAGE, DELAY_FOLLOW, DELAY_TTY_FLUSH,
};
use crate::protocol::{Category, Content, Notification, Outbound, TtyStatus};
use crate::state::overview::OverviewInstance;
use crate::state::popup::{
    MenuAction, MenuKind, Message, PendingAction, PopupKind, PromptSpec,
};
use crate::state::search::SearchTarget;
use crate::state::tab::Tab;
use crate::state::tty::PushOutcome;

use super::App;

impl App {
    /// Apply one inbound notification. Notifications and commands share
    /// the dispatcher thread, so ordering is the arrival order.
    pub fn handle_notification(&mut self, notification: Notification) {
        tracing::debug!(category = ?notification.category, "notification");
        let follow = notification.follow.clone();
        match notification.category {
            Category::Init => self.on_init(notification.content),
            Category::Auth => self.on_auth(notification),
            Category::Refresh => self.on_refresh(notification.content),
            Category::Loading => self.state.is_loading = true,
            Category::Report => self.on_report(notification),
            Category::Prompt => self.on_prompt(notification.content),
            Category::Tty => self.on_tty(notification.content),
        }
        if let Some(action) = follow {
            // Backend state is not consistent yet; re-ask shortly
            self.effects.push(Effect::Schedule {
                key: TimerKey::Follow,
                delay: DELAY_FOLLOW,
                command: CommandId::WsSend(Outbound::new(action)),
            });
        }
        self.effects.push(Effect::Render);
    }

    // ─── init ────────────────────────────────────────────────────────

    fn on_init(&mut self, content: Content) {
        self.state.tabs = content.tabs.unwrap_or_default();
        for tab in &mut self.state.tabs {
            if let Some(spec) = self.state.pending_sort.remove(&tab.key) {
                tab.sort_spec = Some(spec);
            }
            tab.apply_sort();
        }

        let keys: Vec<String> = self.state.tabs.iter().map(|t| t.key.clone()).collect();
        // Cursors survive a same-shaped round trip; out-of-range or
        // first-seen tabs land on row 1
        for tab in &self.state.tabs {
            let entry = self
                .state
                .navigation
                .current_tabs_rows
                .entry(tab.key.clone())
                .or_insert(1);
            if *entry > tab.rows.len().max(1) {
                *entry = 1;
            }
        }
        self.state
            .navigation
            .current_tabs_rows
            .retain(|key, _| keys.contains(key));

        let first = keys.first().cloned();
        let current_valid = self
            .state
            .navigation
            .current_tab
            .as_ref()
            .map(|k| keys.contains(k))
            .unwrap_or(false);
        if !current_valid && self.state.popup.is_none() && !self.state.inspector.is_enabled {
            self.state.navigation.current_tab = first.clone();
        }
        if let Some(previous) = &self.state.navigation.previous_tab {
            if !keys.contains(previous) {
                self.state.navigation.previous_tab = first;
            }
        }

        if let Some(agents) = content.agents {
            self.state.routing.capture_agents(agents);
        }
        if let Some(hosts) = content.hosts {
            self.state.routing.capture_hosts(hosts);
        }

        // A cross-host jump lands here after the switch round trip
        if let Some(backlog) = self.state.jump.backlog.take() {
            if self.state.tab(&backlog.tab_key).is_some() {
                self.state.navigation.current_tab = Some(backlog.tab_key.clone());
                self.focus_row(&backlog.tab_key, backlog.identity.as_deref());
            }
        }

        if self.state.search.is_enabled
            && self.state.search.started_on == Some(SearchTarget::Resource)
        {
            if let Some(rows) = self
                .state
                .current_tab_key()
                .map(str::to_string)
                .and_then(|key| self.state.tab(&key).map(|t| t.rows.clone()))
            {
                self.state.search.resnapshot_rows(rows);
                self.apply_search_filter();
            }
        }

        self.state.is_loading = false;
        self.run(CommandId::InspectorTabs);
    }

    // ─── auth ────────────────────────────────────────────────────────

    fn on_auth(&mut self, notification: Notification) {
        let Some(auth) = notification.content.authentication else {
            return;
        };
        let kind = notification.kind.unwrap_or_default();
        match kind.as_str() {
            "error" => {
                self.state.is_authenticated = false;
                self.show_auth_message(&kind, notification.title, auth.message);
                self.effects.push(Effect::Schedule {
                    key: TimerKey::AuthMessage,
                    delay: DELAY_AUTH_MESSAGE,
                    command: CommandId::AuthExpireError,
                });
            }
            "success" if auth.spontaneous => {
                // No-password deployments skip the whole ceremony
                self.run(CommandId::ClearMessage);
                self.run(CommandId::ClearPrompt);
                self.state.is_authenticated = true;
                self.run(CommandId::Init);
            }
            "success" => {
                self.show_auth_message(&kind, notification.title, auth.message);
                self.effects.push(Effect::Schedule {
                    key: TimerKey::AuthMessage,
                    delay: DELAY_AUTH_MESSAGE,
                    command: CommandId::AuthExpireSuccess,
                });
            }
            _ => {}
        }
    }

    fn show_auth_message(&mut self, kind: &str, title: Option<String>, content: String) {
        self.show_message(Message {
            is_enabled: true,
            category: Some("authentication".into()),
            kind: Some(kind.to_string()),
            title,
            content: Some(content),
        });
    }

    // ─── refresh ─────────────────────────────────────────────────────

    fn on_refresh(&mut self, content: Content) {
        if let Some(tab) = content.tab {
            self.refresh_tab(tab);
        }
        if let Some(actions) = content.actions {
            self.refresh_actions(actions);
        }
        if let Some(address) = content.address {
            self.effects.push(Effect::OpenExternal(address));
        }
        if let Some(update) = content.inspector {
            if let Some(tabs) = update.tabs {
                self.refresh_inspector_tabs(tabs);
            }
            if let Some(parts) = update.content {
                self.refresh_inspector_content(parts);
            }
        }
        if let Some(agents) = content.agents {
            // Agent topology changed: the displayed data belongs to the
            // old set, so re-initialize after adopting the new list
            let stale = self
                .state
                .routing
                .current_agent
                .as_ref()
                .is_some_and(|a| !agents.contains(a));
            if stale {
                self.state.routing.current_agent = None;
            }
            self.state.routing.available_agents = agents;
            self.run(CommandId::Init);
        }
        if let Some(overview) = content.overview {
            self.refresh_overview(overview);
        }
        if let Some(enumeration) = content.enumeration {
            self.refresh_enumeration(enumeration);
        }
        self.state.is_loading = false;
    }

    fn refresh_tab(&mut self, mut tab: Tab) {
        if tab.rows.is_empty() {
            // The resource type vanished; drop its tab entirely
            self.state.tabs.retain(|t| t.key != tab.key);
            self.state.navigation.current_tabs_rows.remove(&tab.key);
            let first = self.state.tabs.first().map(|t| t.key.clone());
            if self.state.navigation.current_tab.as_deref() == Some(tab.key.as_str()) {
                self.state.navigation.current_tab = first.clone();
            }
            if self.state.navigation.previous_tab.as_deref() == Some(tab.key.as_str()) {
                self.state.navigation.previous_tab = first;
            }
            return;
        }

        if let Some(spec) = self.state.pending_sort.remove(&tab.key) {
            tab.sort_spec = Some(spec);
        }
        tab.apply_sort();

        let key = tab.key.clone();
        let rows = tab.rows.clone();
        match self.state.tab_mut(&key) {
            Some(existing) => *existing = tab,
            None => self.state.tabs.push(tab),
        }
        let entry = self
            .state
            .navigation
            .current_tabs_rows
            .entry(key.clone())
            .or_insert(1);
        if *entry > rows.len() {
            *entry = 1;
        }

        if self.state.search.is_enabled
            && self.state.search.started_on == Some(SearchTarget::Resource)
            && self.state.current_tab_key() == Some(key.as_str())
        {
            self.state.search.resnapshot_rows(rows);
            self.apply_search_filter();
        }
    }

    fn refresh_actions(&mut self, actions: Vec<MenuAction>) {
        self.state.menu.actions = actions;
        match self.state.popup {
            // A menu popup (bulk included) is already up: repopulate it
            Some(PopupKind::Menu(_)) => self.state.navigation.current_menu_row = Some(1),
            _ => self.run(CommandId::ShowPopup(PopupKind::Menu(MenuKind::Menu))),
        }
    }

    fn refresh_inspector_tabs(&mut self, tabs: Vec<String>) {
        let keep_current = self
            .state
            .inspector
            .current_tab
            .as_ref()
            .map(|t| tabs.contains(t))
            .unwrap_or(false);
        if !keep_current {
            self.state.inspector.current_tab = tabs.first().cloned();
        }
        self.state.inspector.available_tabs = tabs;
        if self.state.inspector.current_tab.is_some() {
            self.run(CommandId::RefreshInspector);
        } else {
            self.state.inspector.reset_content();
        }
    }

    fn refresh_inspector_content(&mut self, parts: Vec<crate::state::inspector::InspectorPart>) {
        self.state.inspector.apply_content(parts);
        if self.state.search.is_enabled && self.state.search.started_on == Some(SearchTarget::Logs)
        {
            let lines = self.state.inspector.all_lines();
            self.state.search.resnapshot_lines(lines);
            self.apply_search_filter();
        }
    }

    fn refresh_overview(&mut self, instances: Vec<OverviewInstance>) {
        self.state.overview.merge(instances);
        // First contact with a master fronting other hosts: adopt the
        // host list and rerun the overview against the elected host
        if self.state.routing.available_hosts.is_empty() {
            if let Some(hosts) = self.state.overview.discovered_hosts().map(<[String]>::to_vec) {
                self.state.routing.capture_hosts(hosts.clone());
                if self.state.routing.current_host.is_none() {
                    self.state.routing.current_host = hosts.into_iter().next();
                }
                self.state.overview.instances.clear();
                self.send(Outbound::new("overview"));
            }
        } else if self.state.overview.discovered_hosts().is_some() {
            // Nested discovery rounds are a single level deep
            tracing::warn!("host list in overview after discovery, ignoring");
        }
    }

    fn refresh_enumeration(&mut self, resources: Vec<crate::state::jump::RemoteResource>) {
        // Answers arriving after the popup closed are stale
        if !self.state.jump.is_enabled {
            return;
        }
        self.state.jump.remote_resources.extend(resources);
        self.jump_apply();
    }

    // ─── report / prompt / tty ───────────────────────────────────────

    fn on_report(&mut self, notification: Notification) {
        self.state.is_loading = false;
        if !notification.display {
            return;
        }
        self.show_message(Message {
            is_enabled: true,
            category: Some("report".into()),
            kind: notification.kind,
            title: notification.title,
            content: notification.content.message,
        });
    }

    fn on_prompt(&mut self, content: Content) {
        self.state.is_loading = false;
        let Some(command) = content.command else {
            return;
        };
        let mut message = Outbound::new(command);
        if let Some(row) = self.state.current_row().cloned() {
            message = message.with_resource(&row);
        }
        self.run(CommandId::ShowPrompt(PromptSpec {
            text: content.message,
            input: None,
            on_confirm: PendingAction::SendMessage(message),
            is_for_authentication: false,
        }));
    }

    fn on_tty(&mut self, content: Content) {
        self.state.is_loading = false;
        match content.status {
            Some(TtyStatus::Started) => {
                self.state.tty.start(content.session_type);
                self.run(CommandId::ShowPopup(PopupKind::Tty));
            }
            Some(TtyStatus::Exited) => {
                // Server-side teardown: no quit message to send back
                self.state.tty.quit();
                if self.state.popup == Some(PopupKind::Tty) {
                    self.run(CommandId::ClearPopup);
                }
            }
            None => {}
        }
        if let Some(output) = content.output {
            if self.state.tty.is_enabled
                && self.state.tty.push_output(&output) == PushOutcome::NeedsIdleFlush
            {
                self.effects.push(Effect::Schedule {
                    key: TimerKey::TtyFlush,
                    delay: DELAY_TTY_FLUSH,
                    command: CommandId::TtyFlush,
                });
            }
        }
    }
}
