// Jump - global fuzzy/substring search across local and remote resources

use nucleo::pattern::{CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher, Utf32String};
use serde::{Deserialize, Serialize};

use super::tab::{Row, Tab};

/// A host-tagged resource record received from a remote enumeration
/// broadcast. Local resources are read straight from the tab set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResource {
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Tab")]
    pub tab_key: String,
    #[serde(rename = "Resource")]
    pub row: Row,
}

/// One selectable jump result. `host` is None for local resources.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpResult {
    pub host: Option<String>,
    pub tab_key: String,
    pub identity: Option<String>,
    pub label: String,
}

/// A cross-host jump target remembered while the host switch round-trip
/// is in flight; resolved once the post-switch `init` arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpBacklog {
    pub tab_key: String,
    pub identity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JumpState {
    pub is_enabled: bool,
    pub query: String,
    pub results: Vec<JumpResult>,
    /// Accumulates asynchronously as remote hosts answer the broadcast.
    pub remote_resources: Vec<RemoteResource>,
    pub backlog: Option<JumpBacklog>,
}

impl JumpState {
    pub fn open(&mut self) {
        self.is_enabled = true;
        self.query.clear();
        self.results.clear();
        self.remote_resources.clear();
    }

    pub fn close(&mut self) {
        self.is_enabled = false;
        self.query.clear();
        self.results.clear();
        self.remote_resources.clear();
    }

    /// Recompute `results` from the current query. Substring mode joins
    /// every cell value; fuzzy mode scores the `Name` field. Local
    /// results always precede remote ones.
    pub fn recompute(&mut self, tabs: &[Tab], fuzzy: bool) {
        let mut results = Vec::new();

        let local = tabs.iter().flat_map(|tab| {
            tab.rows
                .iter()
                .map(move |row| (None::<String>, tab.key.clone(), row))
        });
        let remote = self
            .remote_resources
            .iter()
            .map(|r| (Some(r.host.clone()), r.tab_key.clone(), &r.row));

        for source in [
            local.collect::<Vec<_>>(),
            remote.collect::<Vec<_>>(),
        ] {
            let mut scored: Vec<(u32, JumpResult)> = source
                .into_iter()
                .filter_map(|(host, tab_key, row)| {
                    score(row, &self.query, fuzzy).map(|s| {
                        (
                            s,
                            JumpResult {
                                host,
                                tab_key,
                                identity: row.identity().map(String::from),
                                label: row.name.clone().unwrap_or_else(|| row.joined_values()),
                            },
                        )
                    })
                })
                .collect();
            if fuzzy && !self.query.is_empty() {
                scored.sort_by(|a, b| b.0.cmp(&a.0));
            }
            results.extend(scored.into_iter().map(|(_, r)| r));
        }

        self.results = results;
    }
}

fn score(row: &Row, query: &str, fuzzy: bool) -> Option<u32> {
    if query.is_empty() {
        return Some(0);
    }
    if fuzzy {
        let name = row.name.as_deref()?;
        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
        let mut matcher = Matcher::new(Config::DEFAULT);
        let haystack: Utf32String = name.into();
        pattern.score(haystack.slice(..), &mut matcher)
    } else {
        row.joined_values()
            .to_lowercase()
            .contains(&query.to_lowercase())
            .then_some(0)
    }
}
