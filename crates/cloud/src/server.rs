// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The upstream CI server that assigns work to agents.

use crate::error::CloudError;
use armada_core::{Agent, Agents};
use async_trait::async_trait;

#[async_trait]
pub trait ServerBackend: Send + Sync {
    /// The server's current view of this fleet's elastic agents.
    async fn list_agents(&self) -> Result<Agents, CloudError>;

    /// Stop the server assigning new work to these agents.
    async fn disable_agents(&self, agents: &[Agent]) -> Result<(), CloudError>;

    /// Remove the agents from the server entirely.
    async fn delete_agents(&self, agents: &[Agent]) -> Result<(), CloudError>;
}
