// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle against the container control plane.

use crate::error::CloudError;
use armada_core::{AgentTask, CreateTaskRequest, FleetConfig, JobIdentity, LogSink, TaskProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A task as listed by the control plane. Tasks created by this engine
/// carry enough metadata to be reconstructed after a restart; foreign
/// tasks (other servers, manual launches) come back with those fields
/// empty and are left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescription {
    pub agent_id: String,
    pub task_arn: String,
    pub definition_arn: String,
    pub host_id: Option<String>,
    pub created_at_ms: u64,
    pub job: Option<JobIdentity>,
    pub profile: Option<TaskProfile>,
    /// Id of the server that created the task, from task metadata.
    pub server_id: Option<String>,
}

/// Creating, stopping and listing agent tasks.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Launch a task for the request, or return `Ok(None)` when no
    /// capacity fits and none may be added.
    async fn create(
        &self,
        request: &CreateTaskRequest,
        config: &FleetConfig,
        log: &dyn LogSink,
    ) -> Result<Option<AgentTask>, CloudError>;

    /// Stop the task and release whatever the control plane holds for it.
    async fn stop_and_cleanup(&self, config: &FleetConfig, task: &AgentTask)
        -> Result<(), CloudError>;

    /// Every task currently visible in the fleet's cluster, ours or not.
    async fn list_all_tasks(&self, config: &FleetConfig) -> Result<Vec<TaskDescription>, CloudError>;
}
