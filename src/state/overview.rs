// Overview - instance records across the known hosts

use serde::{Deserialize, Serialize};

/// One orchestration instance as reported by an overview round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewInstance {
    #[serde(rename = "Server", default)]
    pub server: String,
    #[serde(rename = "Role", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "Hosts", default)]
    pub hosts: Vec<String>,
    #[serde(rename = "Resources", default)]
    pub resources: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewState {
    pub instances: Vec<OverviewInstance>,
}

impl OverviewState {
    /// Merge incoming instance records, keyed by server identity.
    pub fn merge(&mut self, incoming: Vec<OverviewInstance>) {
        for instance in incoming {
            match self
                .instances
                .iter_mut()
                .find(|i| i.server == instance.server)
            {
                Some(existing) => *existing = instance,
                None => self.instances.push(instance),
            }
        }
    }

    /// A host-discovery round: exactly one instance exposing a host
    /// list. Single-level nesting is the supported case.
    pub fn discovered_hosts(&self) -> Option<&[String]> {
        match self.instances.as_slice() {
            [only] if !only.hosts.is_empty() => Some(&only.hosts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_replaces_by_server() {
        let mut overview = OverviewState::default();
        overview.merge(vec![OverviewInstance {
            server: "master".into(),
            ..Default::default()
        }]);
        overview.merge(vec![
            OverviewInstance {
                server: "master".into(),
                role: Some("primary".into()),
                ..Default::default()
            },
            OverviewInstance {
                server: "edge".into(),
                ..Default::default()
            },
        ]);
        assert_eq!(overview.instances.len(), 2);
        assert_eq!(overview.instances[0].role.as_deref(), Some("primary"));
    }

    #[test]
    fn test_discovery_requires_single_instance_with_hosts() {
        let mut overview = OverviewState::default();
        overview.merge(vec![OverviewInstance {
            server: "master".into(),
            hosts: vec!["h1".into(), "h2".into()],
            ..Default::default()
        }]);
        assert_eq!(
            overview.discovered_hosts(),
            Some(&["h1".to_string(), "h2".to_string()][..])
        );

        overview.merge(vec![OverviewInstance {
            server: "edge".into(),
            ..Default::default()
        }]);
        assert_eq!(overview.discovered_hosts(), None);
    }
}
