// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders and capture types shared by tests across crates.

use crate::instance::{CapacityHost, RemoteInstance};
use crate::job::JobIdentity;
use crate::log_sink::LogSink;
use crate::platform::{LifecycleState, Platform, PricingModel};
use crate::task::TaskProfile;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Log sink that keeps every line for assertion.
#[derive(Debug, Clone, Default)]
pub struct VecLogSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl VecLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl LogSink for VecLogSink {
    fn accept(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// A running Linux on-demand instance matching [`linux_profile`].
pub fn linux_instance(id: &str) -> RemoteInstance {
    RemoteInstance {
        id: id.to_string(),
        platform: Platform::Linux,
        lifecycle: LifecycleState::Running,
        launched_at_ms: 0,
        image_id: "ami-1".to_string(),
        instance_type: "t3.large".to_string(),
        subnet_id: None,
        security_groups: vec![],
        spot_request_id: None,
        tags: HashMap::new(),
    }
}

/// The spot twin of [`linux_instance`].
pub fn spot_instance(id: &str) -> RemoteInstance {
    let mut instance = linux_instance(id);
    instance.spot_request_id = Some(format!("sir-{id}"));
    instance
}

pub fn linux_profile() -> TaskProfile {
    TaskProfile::new(Platform::Linux, "ami-1", "t3.large", PricingModel::OnDemand)
}

pub fn spot_profile() -> TaskProfile {
    TaskProfile::new(Platform::Linux, "ami-1", "t3.large", PricingModel::Spot)
}

/// An idle, connected host on the given instance.
pub fn idle_host(host_id: &str, instance_id: &str) -> CapacityHost {
    CapacityHost {
        host_id: host_id.to_string(),
        instance_id: instance_id.to_string(),
        agent_connected: true,
        active: true,
        pending_tasks: 0,
        running_tasks: 0,
        remaining_cpu: 2048,
        remaining_memory_mb: 4096,
    }
}

pub fn job(job_id: u64) -> JobIdentity {
    JobIdentity::new("deploy", 1, "package", "1", "build-image", job_id)
}
