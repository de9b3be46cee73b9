// Command identifiers, effect descriptors and timer keys
//
// Commands are a closed enum rather than string-keyed dynamic dispatch:
// unknown identifiers cannot exist past the input boundary, and private
// transition primitives are a method, not a naming convention the
// dispatcher has to re-parse.

use std::time::Duration;

use crate::protocol::Outbound;
use crate::state::popup::{Message, PopupKind, PromptSpec};

/// Fixed delays for timer-based continuations.
pub const DELAY_AUTH_MESSAGE: Duration = Duration::from_millis(2000);
pub const DELAY_TTY_FLUSH: Duration = Duration::from_millis(50);
pub const DELAY_FOLLOW: Duration = Duration::from_millis(250);
pub const DELAY_JUMP_DEBOUNCE: Duration = Duration::from_millis(150);
pub const RECONNECT_INTERVAL: Duration = Duration::from_millis(1000);

/// Every command the dispatcher knows. Public commands are reachable
/// from the input surface by name; private ones are internal transition
/// primitives composed by other handlers and bypass the permission gate.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandId {
    // Navigation
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    NextTab,
    PreviousTab,
    NextSubTab,
    PreviousSubTab,
    GoToTab(usize),
    // Interaction
    Confirm,
    Reject,
    Quit,
    Help,
    Menu,
    Bulk,
    Prompt(PromptSpec),
    Message(Message),
    // Resource shortcuts
    Remove,
    Pause,
    Stop,
    RunRestart,
    Rename,
    ShellContainer,
    ShellSystem,
    Browser,
    Hub,
    Pull,
    Browse,
    Reload,
    Project,
    // Modal surfaces
    Overview,
    Jump,
    Search,
    Parameters,
    ThemePicker,
    AgentPicker,
    HostPicker,
    // Routing
    NextAgent,
    PreviousAgent,
    NextHost,
    PreviousHost,
    // Appearance
    NextLayout,
    PreviousLayout,
    // TTY (public surface)
    TtyQuit,

    // Private transition primitives
    Render,
    Init,
    Exit,
    ShowPrompt(PromptSpec),
    ClearPrompt,
    ShowPopup(PopupKind),
    ClearPopup,
    ClearMessage,
    EnterInspect,
    ExitInspect,
    WsSend(Outbound),
    InspectorTabs,
    RefreshInspector,
    ShowAuthentication,
    Authenticate,
    AuthExpireError,
    AuthExpireSuccess,
    PromptInput(String),
    SearchQuery(String),
    JumpQuery(String),
    JumpApply,
    TtyExec(String),
    TtyClear,
    TtyErase,
    TtyDraft(String),
    TtyHistoryPrevious,
    TtyHistoryNext,
    TtyFlush,
    TtyQuitSession,
    ImagePull(String),
    ImageRun(String),
    ContainerRename(String),
    AgentSwitch(Option<String>),
    HostSwitch(String),
    ThemeSet(String),
    ParameterToggle(String),
}

impl CommandId {
    /// Private commands bypass the permission gate entirely.
    pub fn is_private(&self) -> bool {
        use CommandId::*;
        matches!(
            self,
            Render
                | Init
                | Exit
                | ShowPrompt(_)
                | ClearPrompt
                | ShowPopup(_)
                | ClearPopup
                | ClearMessage
                | EnterInspect
                | ExitInspect
                | WsSend(_)
                | InspectorTabs
                | RefreshInspector
                | ShowAuthentication
                | Authenticate
                | AuthExpireError
                | AuthExpireSuccess
                | PromptInput(_)
                | SearchQuery(_)
                | JumpQuery(_)
                | JumpApply
                | TtyExec(_)
                | TtyClear
                | TtyErase
                | TtyDraft(_)
                | TtyHistoryPrevious
                | TtyHistoryNext
                | TtyFlush
                | TtyQuitSession
                | ImagePull(_)
                | ImageRun(_)
                | ContainerRename(_)
                | AgentSwitch(_)
                | HostSwitch(_)
                | ThemeSet(_)
                | ParameterToggle(_)
        )
    }

    /// The identifier the input surface and logs use. Private commands
    /// keep the leading-underscore convention.
    pub fn name(&self) -> &'static str {
        use CommandId::*;
        match self {
            ScrollUp => "scrollUp",
            ScrollDown => "scrollDown",
            ScrollLeft => "scrollLeft",
            ScrollRight => "scrollRight",
            NextTab => "nextTab",
            PreviousTab => "previousTab",
            NextSubTab => "nextSubTab",
            PreviousSubTab => "previousSubTab",
            GoToTab(_) => "goToTab",
            Confirm => "confirm",
            Reject => "reject",
            Quit => "quit",
            Help => "help",
            Menu => "menu",
            Bulk => "bulk",
            Prompt(_) => "prompt",
            Message(_) => "message",
            Remove => "remove",
            Pause => "pause",
            Stop => "stop",
            RunRestart => "run_restart",
            Rename => "rename",
            ShellContainer => "shellContainer",
            ShellSystem => "shellSystem",
            Browser => "browser",
            Hub => "hub",
            Pull => "pull",
            Browse => "browse",
            Reload => "reload",
            Project => "project",
            Overview => "overview",
            Jump => "jump",
            Search => "search",
            Parameters => "parameters",
            ThemePicker => "theme",
            AgentPicker => "agent",
            HostPicker => "host",
            NextAgent => "nextAgent",
            PreviousAgent => "previousAgent",
            NextHost => "nextHost",
            PreviousHost => "previousHost",
            NextLayout => "nextLayout",
            PreviousLayout => "previousLayout",
            TtyQuit => "ttyQuit",
            Render => "_render",
            Init => "_init",
            Exit => "_exit",
            ShowPrompt(_) => "_showPrompt",
            ClearPrompt => "_clearPrompt",
            ShowPopup(_) => "_showPopup",
            ClearPopup => "_clearPopup",
            ClearMessage => "_clearMessage",
            EnterInspect => "_enterInspect",
            ExitInspect => "_exitInspect",
            WsSend(_) => "_wsSend",
            InspectorTabs => "_inspectorTabs",
            RefreshInspector => "_refreshInspector",
            ShowAuthentication => "_showAuthentication",
            Authenticate => "_authenticate",
            AuthExpireError => "_authExpireError",
            AuthExpireSuccess => "_authExpireSuccess",
            PromptInput(_) => "_promptInput",
            SearchQuery(_) => "_searchQuery",
            JumpQuery(_) => "_jumpQuery",
            JumpApply => "_jumpApply",
            TtyExec(_) => "_ttyExec",
            TtyClear => "_ttyClear",
            TtyErase => "_ttyErase",
            TtyDraft(_) => "_ttyDraft",
            TtyHistoryPrevious => "_ttyHistoryPrevious",
            TtyHistoryNext => "_ttyHistoryNext",
            TtyFlush => "_ttyFlush",
            TtyQuitSession => "_ttyQuitSession",
            ImagePull(_) => "_imagePull",
            ImageRun(_) => "_imageRun",
            ContainerRename(_) => "_containerRename",
            AgentSwitch(_) => "_agentSwitch",
            HostSwitch(_) => "_hostSwitch",
            ThemeSet(_) => "_themeSet",
            ParameterToggle(_) => "_parameterToggle",
        }
    }

    /// Resolve a payload-less public command by its surface name. Used
    /// for the static keymap and for menu actions flagged `run_locally`.
    pub fn from_name(name: &str) -> Option<CommandId> {
        use CommandId::*;
        Some(match name {
            "scrollUp" => ScrollUp,
            "scrollDown" => ScrollDown,
            "scrollLeft" => ScrollLeft,
            "scrollRight" => ScrollRight,
            "nextTab" => NextTab,
            "previousTab" => PreviousTab,
            "nextSubTab" => NextSubTab,
            "previousSubTab" => PreviousSubTab,
            "firstTab" => GoToTab(0),
            "secondTab" => GoToTab(1),
            "thirdTab" => GoToTab(2),
            "fourthTab" => GoToTab(3),
            "confirm" => Confirm,
            "reject" => Reject,
            "quit" => Quit,
            "help" => Help,
            "menu" => Menu,
            "bulk" => Bulk,
            "remove" => Remove,
            "pause" => Pause,
            "stop" => Stop,
            "run_restart" => RunRestart,
            "rename" => Rename,
            "shellContainer" => ShellContainer,
            "shellSystem" => ShellSystem,
            "browser" => Browser,
            "hub" => Hub,
            "pull" => Pull,
            "browse" => Browse,
            "reload" => Reload,
            "project" => Project,
            "overview" => Overview,
            "jump" => Jump,
            "search" => Search,
            "parameters" => Parameters,
            "theme" => ThemePicker,
            "agent" => AgentPicker,
            "host" => HostPicker,
            "nextAgent" => NextAgent,
            "previousAgent" => PreviousAgent,
            "nextHost" => NextHost,
            "previousHost" => PreviousHost,
            "nextLayout" => NextLayout,
            "previousLayout" => PreviousLayout,
            "ttyQuit" => TtyQuit,
            _ => return None,
        })
    }
}

/// Identity of a cancellable delayed task. A new schedule for the same
/// key replaces the previous timer instead of stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    AuthMessage,
    TtyFlush,
    Follow,
    JumpDebounce,
}

/// Side effects a handler requests; the core never performs I/O itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The state changed; the render consumer should redraw.
    Render,
    /// Send a protocol message (already router-decorated).
    Send(Outbound),
    /// Dispatch `command` after `delay`, replacing any timer with the
    /// same key.
    Schedule {
        key: TimerKey,
        delay: Duration,
        command: CommandId,
    },
    Cancel(TimerKey),
    /// Open an external address (browser hand-off, out of core scope).
    OpenExternal(String),
    /// Terminate the client loop.
    Exit,
    /// Persist a key/value pair in the settings store.
    Persist { key: String, value: String },
}
