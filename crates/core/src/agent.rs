// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CI agent roster as reported by the server on each ping.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Connection state of an agent as the server sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentState {
    Idle,
    Building,
    LostContact,
    Missing,
    Unknown,
}

/// What the agent's assigned build is doing, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildState {
    Idle,
    Building,
    Cancelled,
    Unknown,
}

/// Whether the server will hand work to this agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigState {
    Pending,
    Enabled,
    Disabled,
}

/// One agent row from the server's elastic-agent listing. `agent_id` is
/// the task identifier the agent registered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    pub agent_state: AgentState,
    pub build_state: BuildState,
    pub config_state: ConfigState,
}

impl Agent {
    pub fn new(
        agent_id: impl Into<String>,
        agent_state: AgentState,
        build_state: BuildState,
        config_state: ConfigState,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_state,
            build_state,
            config_state,
        }
    }

    /// True when the agent is not doing useful work. Lost-contact and
    /// missing agents count as idle so cleanup can reclaim them.
    fn is_reclaimable(&self) -> bool {
        matches!(
            self.agent_state,
            AgentState::Idle | AgentState::LostContact | AgentState::Missing
        )
    }
}

/// The full roster from one server ping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agents {
    agents: Vec<Agent>,
}

impl Agents {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn agent_ids(&self) -> HashSet<String> {
        self.agents.iter().map(|agent| agent.agent_id.clone()).collect()
    }

    /// Enabled agents that are safe to disable: nothing building, nothing
    /// assigned.
    pub fn to_disable(&self) -> Agents {
        Agents::new(
            self.agents
                .iter()
                .filter(|agent| agent.config_state == ConfigState::Enabled && agent.is_reclaimable())
                .cloned()
                .collect(),
        )
    }

    /// Disabled agents that are safe to terminate.
    pub fn to_terminate(&self) -> Agents {
        Agents::new(
            self.agents
                .iter()
                .filter(|agent| agent.config_state == ConfigState::Disabled && agent.is_reclaimable())
                .cloned()
                .collect(),
        )
    }
}

impl IntoIterator for Agents {
    type Item = Agent;
    type IntoIter = std::vec::IntoIter<Agent>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.into_iter()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
