// Popups - the closed modal variant plus prompt/message/menu payloads

use serde::{Deserialize, Serialize};

use crate::protocol::Outbound;

/// Exactly one popup may be active at a time. Entering one suspends tab
/// and inspector focus, restored verbatim on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Prompt,
    Message,
    Menu(MenuKind),
    Tty,
    Help,
    Overview,
    Jump,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Menu,
    Bulk,
    Theme,
    Agent,
    Host,
    Parameters,
}

impl PopupKind {
    /// Menu-family popups share keyboard semantics: a navigable row list
    /// with confirm/reject.
    pub fn is_menu_family(&self) -> bool {
        matches!(
            self,
            PopupKind::Menu(_) | PopupKind::Overview | PopupKind::Jump
        )
    }
}

/// A menu action descriptor sent by the server. Strongly typed; the
/// dispatcher consumes these fields directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuAction {
    #[serde(rename = "Command", default)]
    pub command: String,
    #[serde(rename = "Key", default)]
    pub key: String,
    #[serde(rename = "Label", default)]
    pub label: String,
    #[serde(rename = "Prompt", default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(rename = "PromptInput", default, skip_serializing_if = "Option::is_none")]
    pub prompt_input: Option<String>,
    #[serde(rename = "RequiresResource", default)]
    pub requires_resource: bool,
    #[serde(rename = "RunLocally", default)]
    pub run_locally: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu {
    pub actions: Vec<MenuAction>,
}

impl Menu {
    /// Row count including the synthetic trailing "cancel" row.
    pub fn row_count(&self) -> usize {
        self.actions.len() + 1
    }
}

/// What confirming a prompt does. Continuations are data, never live
/// closures, so state stays inspectable and serializable.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    /// Send a prepared protocol message as-is.
    SendMessage(Outbound),
    /// Send a prepared message with the typed value attached under
    /// `field` (server-described prompt inputs).
    SendMessageWithInput { message: Outbound, field: String },
    /// Dispatch a command by identifier.
    Invoke(Box<crate::command::CommandId>),
    /// Build a command from the captured input value at confirm time.
    WithInput(InputAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Authenticate,
    PullImage,
    RunImage,
    RenameContainer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptInputSpec {
    pub name: String,
    pub placeholder: String,
    pub is_secret: bool,
}

/// Everything needed to open a prompt, carried by the `prompt` command.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub text: Option<String>,
    pub input: Option<PromptInputSpec>,
    pub on_confirm: PendingAction,
    pub is_for_authentication: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub is_enabled: bool,
    pub text: Option<String>,
    pub input: Option<PromptInputSpec>,
    pub input_value: String,
    pub on_confirm: Option<PendingAction>,
    pub is_for_authentication: bool,
}

impl Prompt {
    pub fn open(&mut self, spec: PromptSpec) {
        self.is_enabled = true;
        self.text = spec.text;
        self.input = spec.input;
        self.input_value.clear();
        self.on_confirm = Some(spec.on_confirm);
        self.is_for_authentication = spec.is_for_authentication;
    }

    pub fn clear(&mut self) {
        *self = Prompt::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub is_enabled: bool,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Message {
    pub fn clear(&mut self) {
        *self = Message::default();
    }
}

/// Which contextual key hints the render consumer should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Helper {
    #[default]
    Default,
    Menu,
    Prompt,
    PromptInput,
    Message,
}
