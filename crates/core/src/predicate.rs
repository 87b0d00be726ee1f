// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Termination-eligibility rules for stopped and idle instances.

use crate::config::FleetConfig;
use crate::instance::RemoteInstance;

/// Whether a stopped on-demand instance has lingered long enough to
/// terminate. An instance stopped outside our control carries no
/// stopped-at marker; those are reclaimed immediately rather than kept
/// around forever.
pub fn eligible_for_termination(config: &FleetConfig, instance: &RemoteInstance, now_ms: u64) -> bool {
    if !instance.lifecycle.is_stopped() {
        return false;
    }
    let window_ms = config
        .limits(instance.platform)
        .terminate_stopped_after
        .as_millis() as u64;
    match instance.stopped_at_ms() {
        Some(stopped_at) => now_ms.saturating_sub(stopped_at) > window_ms,
        None => true,
    }
}

/// Whether an idle spot instance has been idle long enough to terminate.
/// A spot instance with no idle marker has never been observed idle and
/// is never eligible; the marker appears the first time a cycle sees it
/// without work.
pub fn spot_eligible_for_termination(
    config: &FleetConfig,
    instance: &RemoteInstance,
    now_ms: u64,
) -> bool {
    let window_ms = config
        .limits(instance.platform)
        .terminate_idle_spot_after
        .as_millis() as u64;
    match instance.last_seen_idle_ms() {
        Some(idle_since) => now_ms.saturating_sub(idle_since) > window_ms,
        None => false,
    }
}

#[cfg(test)]
#[path = "predicate_tests.rs"]
mod tests;
