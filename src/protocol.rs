// Wire protocol - JSON envelopes over the persistent WebSocket

use serde::{Deserialize, Serialize};

use crate::state::inspector::InspectorPart;
use crate::state::jump::RemoteResource;
use crate::state::overview::OverviewInstance;
use crate::state::popup::MenuAction;
use crate::state::tab::{Row, Tab};

/// An outbound protocol message. The communication router injects
/// `Agent`/`Host` from routing state unless `skip_routing` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    #[serde(rename = "Agent", default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(rename = "Host", default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip)]
    pub skip_routing: bool,
}

impl Outbound {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_arg(mut self, key: &str, value: impl Serialize) -> Self {
        let map = self
            .args
            .get_or_insert_with(|| serde_json::Value::Object(Default::default()));
        if let serde_json::Value::Object(map) = map {
            map.insert(
                key.to_string(),
                serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
            );
        }
        self
    }

    pub fn with_resource(self, row: &Row) -> Self {
        self.with_arg("Resource", row)
    }

    /// Opt out of router decoration (fan-out messages address their own
    /// target explicitly).
    pub fn undecorated(mut self) -> Self {
        self.skip_routing = true;
        self
    }

    pub fn to_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn to_agent(mut self, agent: &str) -> Self {
        self.agent = Some(agent.to_string());
        self
    }
}

/// Inbound notification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Init,
    Auth,
    Refresh,
    Loading,
    Report,
    Prompt,
    Tty,
}

/// An inbound asynchronous notification from the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Content", default)]
    pub content: Content,
    /// Action to re-issue after a short delay (backends whose state is
    /// not immediately consistent after the triggering action).
    #[serde(rename = "Follow", default)]
    pub follow: Option<String>,
    #[serde(rename = "Display", default)]
    pub display: bool,
}

/// Heterogeneous notification payload; sub-fields are processed
/// independently by the handler for the envelope's category.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Content {
    // init
    #[serde(rename = "Tabs", default)]
    pub tabs: Option<Vec<Tab>>,
    // auth
    #[serde(rename = "Authentication", default)]
    pub authentication: Option<Authentication>,
    // refresh
    #[serde(rename = "Tab", default)]
    pub tab: Option<Tab>,
    #[serde(rename = "Actions", default)]
    pub actions: Option<Vec<MenuAction>>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "Inspector", default)]
    pub inspector: Option<InspectorUpdate>,
    #[serde(rename = "Agents", default)]
    pub agents: Option<Vec<String>>,
    #[serde(rename = "Hosts", default)]
    pub hosts: Option<Vec<String>>,
    #[serde(rename = "Overview", default)]
    pub overview: Option<Vec<OverviewInstance>>,
    #[serde(rename = "Enumeration", default)]
    pub enumeration: Option<Vec<RemoteResource>>,
    // report / prompt
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "Command", default)]
    pub command: Option<String>,
    // tty
    #[serde(rename = "Status", default)]
    pub status: Option<TtyStatus>,
    #[serde(rename = "Type", default)]
    pub session_type: Option<String>,
    #[serde(rename = "Output", default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Authentication {
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Spontaneous", default)]
    pub spontaneous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InspectorUpdate {
    #[serde(rename = "Tabs", default)]
    pub tabs: Option<Vec<String>>,
    #[serde(rename = "Content", default)]
    pub content: Option<Vec<InspectorPart>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TtyStatus {
    Started,
    Exited,
}
