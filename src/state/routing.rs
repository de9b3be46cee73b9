// Communication routing - which agent/host outbound envelopes target

use crate::protocol::Outbound;

/// Tracks the current target of outbound requests. `current_agent` of
/// None means the master server itself; hosts have no such sentinel,
/// every host is a first-class target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingState {
    pub current_agent: Option<String>,
    pub available_agents: Vec<String>,
    pub current_host: Option<String>,
    pub available_hosts: Vec<String>,
}

impl RoutingState {
    /// Inject Agent/Host envelope fields unless the caller opted out
    /// (broadcast-style fan-out messages carry their own targets).
    pub fn decorate(&self, message: &mut Outbound) {
        if message.skip_routing {
            return;
        }
        if message.agent.is_none() {
            message.agent = self.current_agent.clone();
        }
        if message.host.is_none() {
            message.host = self.current_host.clone();
        }
    }

    /// Next agent, with an implicit "master" sentinel on both ends:
    /// master -> a1 -> ... -> aN -> master.
    pub fn next_agent(&self) -> Option<String> {
        match &self.current_agent {
            None => self.available_agents.first().cloned(),
            Some(current) => {
                let index = self.available_agents.iter().position(|a| a == current)?;
                self.available_agents.get(index + 1).cloned()
            }
        }
    }

    pub fn previous_agent(&self) -> Option<String> {
        match &self.current_agent {
            None => self.available_agents.last().cloned(),
            Some(current) => {
                let index = self.available_agents.iter().position(|a| a == current)?;
                index.checked_sub(1).and_then(|i| self.available_agents.get(i).cloned())
            }
        }
    }

    /// Plain wraparound over the known hosts.
    pub fn next_host(&self) -> Option<String> {
        cycle_host(&self.available_hosts, self.current_host.as_deref(), 1)
    }

    pub fn previous_host(&self) -> Option<String> {
        cycle_host(&self.available_hosts, self.current_host.as_deref(), -1)
    }

    /// Capture server-provided lists, first sight only.
    pub fn capture_agents(&mut self, agents: Vec<String>) {
        if self.available_agents.is_empty() {
            self.available_agents = agents;
        }
    }

    pub fn capture_hosts(&mut self, hosts: Vec<String>) {
        if self.available_hosts.is_empty() {
            self.available_hosts = hosts;
        }
    }
}

fn cycle_host(hosts: &[String], current: Option<&str>, step: i64) -> Option<String> {
    if hosts.is_empty() {
        return None;
    }
    let len = hosts.len() as i64;
    let index = current
        .and_then(|c| hosts.iter().position(|h| h == c))
        .unwrap_or(0) as i64;
    let next = (index + step).rem_euclid(len) as usize;
    hosts.get(next).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn routing() -> RoutingState {
        RoutingState {
            available_agents: vec!["a1".into(), "a2".into()],
            available_hosts: vec!["h1".into(), "h2".into(), "h3".into()],
            ..RoutingState::default()
        }
    }

    #[test]
    fn test_agent_cycle_returns_to_master() {
        let mut r = routing();
        // master -> a1 -> a2 -> master
        let hops: Vec<Option<String>> = (0..3)
            .map(|_| {
                let next = r.next_agent();
                r.current_agent = next.clone();
                next
            })
            .collect();
        assert_eq!(
            hops,
            vec![Some("a1".to_string()), Some("a2".to_string()), None]
        );
    }

    #[test]
    fn test_agent_cycle_backwards_from_master() {
        let r = routing();
        assert_eq!(r.previous_agent(), Some("a2".to_string()));
    }

    #[test]
    fn test_host_cycle_wraps_without_sentinel() {
        let mut r = routing();
        r.current_host = Some("h3".into());
        assert_eq!(r.next_host(), Some("h1".to_string()));
        r.current_host = Some("h1".into());
        assert_eq!(r.previous_host(), Some("h3".to_string()));
    }

    #[test]
    fn test_capture_is_first_sight_only() {
        let mut r = routing();
        r.capture_agents(vec!["other".into()]);
        assert_eq!(r.available_agents, vec!["a1", "a2"]);

        let mut fresh = RoutingState::default();
        fresh.capture_agents(vec!["x".into()]);
        assert_eq!(fresh.available_agents, vec!["x"]);
    }

    #[test]
    fn test_decoration_and_opt_out() {
        let mut r = routing();
        r.current_agent = Some("a1".into());
        r.current_host = Some("h2".into());

        let mut msg = Outbound::new("init");
        r.decorate(&mut msg);
        assert_eq!(msg.agent.as_deref(), Some("a1"));
        assert_eq!(msg.host.as_deref(), Some("h2"));

        let mut broadcast = Outbound::new("enumerate").undecorated();
        r.decorate(&mut broadcast);
        assert_eq!(broadcast.agent, None);
        assert_eq!(broadcast.host, None);
    }
}
