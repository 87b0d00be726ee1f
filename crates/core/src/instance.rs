// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote compute instances and container-capacity hosts.
//!
//! Both are observed through the cloud control plane, never owned. The
//! idle/stopped markers live as epoch-millisecond tags on the instance
//! rather than in local state, so they survive a process restart.

use crate::platform::{LifecycleState, Platform};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Tag carrying the epoch ms at which an instance was last seen idle.
pub const LAST_SEEN_IDLE: &str = "LAST_SEEN_IDLE";
/// Tag carrying the epoch ms at which an instance was stopped.
pub const STOPPED_AT: &str = "STOPPED_AT";

/// A compute instance visible through the cloud control plane.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteInstance {
    pub id: String,
    pub platform: Platform,
    pub lifecycle: LifecycleState,
    pub launched_at_ms: u64,
    pub image_id: String,
    pub instance_type: String,
    pub subnet_id: Option<String>,
    pub security_groups: Vec<String>,
    pub spot_request_id: Option<String>,
    pub tags: HashMap<String, String>,
}

impl RemoteInstance {
    pub fn is_spot(&self) -> bool {
        self.spot_request_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    fn tag_ms(&self, key: &str) -> Option<u64> {
        self.tag(key).and_then(|value| value.parse().ok())
    }

    pub fn last_seen_idle_ms(&self) -> Option<u64> {
        self.tag_ms(LAST_SEEN_IDLE)
    }

    pub fn stopped_at_ms(&self) -> Option<u64> {
        self.tag_ms(STOPPED_AT)
    }

    /// Time since this instance was last seen idle. A missing marker means
    /// "idle since now", i.e. zero.
    pub fn idle_duration_ms(&self, now_ms: u64) -> u64 {
        self.last_seen_idle_ms()
            .map(|ms| now_ms.saturating_sub(ms))
            .unwrap_or(0)
    }
}

/// The cluster-joined object backing a remote instance's ability to run
/// tasks. One-to-one with a [`RemoteInstance`] via `instance_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityHost {
    pub host_id: String,
    pub instance_id: String,
    pub agent_connected: bool,
    pub active: bool,
    pub pending_tasks: u32,
    pub running_tasks: u32,
    pub remaining_cpu: u32,
    pub remaining_memory_mb: u32,
}

impl CapacityHost {
    pub fn is_idle(&self) -> bool {
        self.pending_tasks == 0 && self.running_tasks == 0
    }
}

/// Stable sort, longest-idle first. Equal-idle instances keep their
/// incoming order.
pub fn sort_most_idle_first(instances: &mut [RemoteInstance], now_ms: u64) {
    instances.sort_by_key(|instance| Reverse(instance.idle_duration_ms(now_ms)));
}

/// Stable sort, most-recently-busy first. Used to schedule onto warm
/// capacity while leaving long-idle instances as stop candidates.
pub fn sort_least_idle_first(instances: &mut [RemoteInstance], now_ms: u64) {
    instances.sort_by_key(|instance| instance.idle_duration_ms(now_ms));
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
