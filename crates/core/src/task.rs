// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent tasks and the profiles they are created from.

use crate::job::JobIdentity;
use crate::platform::{Platform, PricingModel};
use serde::{Deserialize, Serialize};

/// Where and on what a task may run. Used both to create tasks and to
/// decide whether existing capacity can host one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProfile {
    pub platform: Platform,
    pub image_id: String,
    pub instance_type: String,
    /// Candidate subnets; empty means any subnet is acceptable.
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_groups: Vec<String>,
    pub pricing: PricingModel,
}

impl TaskProfile {
    pub fn new(
        platform: Platform,
        image_id: impl Into<String>,
        instance_type: impl Into<String>,
        pricing: PricingModel,
    ) -> Self {
        Self {
            platform,
            image_id: image_id.into(),
            instance_type: instance_type.into(),
            subnet_ids: Vec::new(),
            security_groups: Vec::new(),
            pricing,
        }
    }

    /// Profile used when launching capacity for its own sake rather than
    /// for one task, e.g. to hold a fleet's minimum size. Empty fields
    /// mean "use the fleet's defaults".
    pub fn for_platform(platform: Platform) -> Self {
        Self::new(platform, "", "", PricingModel::OnDemand)
    }
}

/// Resources a task asks for. Unset dimensions never constrain placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskShape {
    pub cpu: Option<u32>,
    pub memory_mb: Option<u32>,
}

/// One task launched to serve a job, keyed by the agent id its container
/// registers under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTask {
    pub agent_id: String,
    pub task_arn: String,
    pub definition_arn: String,
    /// Instance the task was placed on, once known.
    pub instance_id: Option<String>,
    pub created_at_ms: u64,
    pub job: JobIdentity,
    pub profile: TaskProfile,
}

impl AgentTask {
    /// Whether the task has outlived the registration grace period.
    pub fn created_before(&self, cutoff_ms: u64) -> bool {
        self.created_at_ms < cutoff_ms
    }
}

/// A request to create one task for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub job: JobIdentity,
    pub profile: TaskProfile,
    #[serde(default)]
    pub shape: TaskShape,
}

impl CreateTaskRequest {
    pub fn new(job: JobIdentity, profile: TaskProfile) -> Self {
        Self {
            job,
            profile,
            shape: TaskShape::default(),
        }
    }

    pub fn with_shape(mut self, shape: TaskShape) -> Self {
        self.shape = shape;
        self
    }
}
