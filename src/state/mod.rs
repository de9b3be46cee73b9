// State store - the single source of truth for the whole console
//
// Owned exclusively by the dispatcher; every other component reads and
// writes it only through dispatched commands.

pub mod inspector;
pub mod jump;
pub mod overview;
pub mod popup;
pub mod routing;
pub mod search;
pub mod tab;
pub mod tty;

use std::collections::HashMap;

use inspector::Inspector;
use jump::JumpState;
use overview::OverviewState;
use popup::{Helper, Menu, Message, PopupKind, Prompt};
use routing::RoutingState;
use search::SearchState;
use tab::{Row, Tab};
use tty::TtySession;

/// Cursor state over tabs, rows and menu rows. Row cursors are 1-based
/// and wrap rather than clamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Navigation {
    pub current_tab: Option<String>,
    pub previous_tab: Option<String>,
    pub current_tabs_rows: HashMap<String, usize>,
    pub current_menu_row: Option<usize>,
    pub previous_menu_row: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub available_layouts: Vec<String>,
    pub current_layout: String,
    pub available_themes: Vec<String>,
    pub current_theme: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            available_layouts: vec!["default".into(), "half".into(), "focus".into()],
            current_layout: "default".into(),
            available_themes: vec!["default".into(), "dark".into(), "light".into()],
            current_theme: "default".into(),
        }
    }
}

/// The root aggregate. Created once at startup, mutated for the process
/// lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub has_established_connection: bool,
    pub is_connected: bool,
    pub is_authenticated: bool,
    pub is_loading: bool,

    pub popup: Option<PopupKind>,
    pub helper: Helper,
    pub prompt: Prompt,
    pub message: Message,
    pub menu: Menu,

    pub appearance: Appearance,
    pub navigation: Navigation,
    pub inspector: Inspector,
    pub tabs: Vec<Tab>,
    pub tty: TtySession,
    pub search: SearchState,
    pub jump: JumpState,
    pub routing: RoutingState,
    pub overview: OverviewState,

    /// Sort specs requested before their tab arrived; applied on the
    /// next init/refresh carrying that tab.
    pub pending_sort: HashMap<String, String>,
}

impl State {
    pub fn is_menuing(&self) -> bool {
        self.popup.map(|p| p.is_menu_family()).unwrap_or(false)
    }

    /// The focused tab key, falling back to the suspended one while a
    /// popup or the inspector holds focus.
    pub fn current_tab_key(&self) -> Option<&str> {
        self.navigation
            .current_tab
            .as_deref()
            .or(self.navigation.previous_tab.as_deref())
    }

    pub fn current_tab(&self) -> Option<&Tab> {
        let key = self.current_tab_key()?;
        self.tabs.iter().find(|t| t.key == key)
    }

    pub fn tab(&self, key: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.key == key)
    }

    pub fn tab_mut(&mut self, key: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.key == key)
    }

    /// 1-based row cursor for the given tab.
    pub fn row_cursor(&self, key: &str) -> usize {
        self.navigation
            .current_tabs_rows
            .get(key)
            .copied()
            .unwrap_or(1)
    }

    pub fn current_row(&self) -> Option<&Row> {
        let tab = self.current_tab()?;
        tab.rows.get(self.row_cursor(&tab.key).saturating_sub(1))
    }

    /// First-run state: nothing but the overview is populated yet.
    pub fn data_set_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Suspend tab/menu focus into the previous slots and, if enabled,
    /// the inspector. Symmetric with `restore_focus`.
    pub fn suspend_focus(&mut self) {
        if self.navigation.current_tab.is_some() {
            self.navigation.previous_tab = self.navigation.current_tab.take();
        }
        if self.navigation.current_menu_row.is_some() {
            self.navigation.previous_menu_row = self.navigation.current_menu_row.take();
        }
        if self.inspector.is_enabled {
            self.inspector.was_enabled = true;
            self.inspector.is_enabled = false;
        }
    }

    /// Restore whatever `suspend_focus` pushed aside.
    pub fn restore_focus(&mut self) {
        if self.inspector.was_enabled {
            self.inspector.is_enabled = true;
            self.inspector.was_enabled = false;
        } else {
            self.navigation.current_tab = self.navigation.previous_tab.clone();
            self.navigation.current_menu_row = self.navigation.previous_menu_row;
        }
    }
}
