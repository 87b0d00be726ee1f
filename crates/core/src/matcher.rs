// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matching tasks to existing capacity.

use crate::instance::{CapacityHost, RemoteInstance};
use crate::platform::PricingModel;
use crate::task::{TaskProfile, TaskShape};
use tracing::debug;

/// Whether an existing instance is interchangeable with what this profile
/// would launch. Every axis must agree; reusing a close-but-different
/// instance would run jobs in the wrong environment.
pub fn instance_matches(profile: &TaskProfile, instance: &RemoteInstance) -> bool {
    if instance.platform != profile.platform {
        debug!(instance = %instance.id, "platform mismatch");
        return false;
    }
    if instance.image_id != profile.image_id {
        debug!(instance = %instance.id, have = %instance.image_id, want = %profile.image_id, "image mismatch");
        return false;
    }
    if instance.instance_type != profile.instance_type {
        debug!(instance = %instance.id, have = %instance.instance_type, want = %profile.instance_type, "instance type mismatch");
        return false;
    }
    if !profile.subnet_ids.is_empty() {
        let in_subnet = instance
            .subnet_id
            .as_deref()
            .is_some_and(|subnet| profile.subnet_ids.iter().any(|s| s == subnet));
        if !in_subnet {
            debug!(instance = %instance.id, "subnet mismatch");
            return false;
        }
    }
    let groups_ok = profile
        .security_groups
        .iter()
        .all(|group| instance.security_groups.contains(group));
    if !groups_ok {
        debug!(instance = %instance.id, "security group mismatch");
        return false;
    }
    let wants_spot = profile.pricing == PricingModel::Spot;
    if wants_spot != instance.is_spot() {
        debug!(instance = %instance.id, "pricing mismatch");
        return false;
    }
    true
}

/// Whether a cluster host can take a task of this shape right now.
/// Comparison is strict: the host must keep headroom beyond the request.
pub fn host_matches(host: &CapacityHost, shape: &TaskShape) -> bool {
    if !host.agent_connected || !host.active {
        return false;
    }
    let cpu_ok = shape.cpu.map_or(true, |cpu| cpu < host.remaining_cpu);
    let memory_ok = shape.memory_mb.map_or(true, |mb| mb < host.remaining_memory_mb);
    cpu_ok && memory_ok
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
