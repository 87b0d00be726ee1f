// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance selection for scheduling and scale-in.
//!
//! Both directions share one pipeline: list the fleet's hosts, keep the
//! schedulable instances, order them by policy, then either scan for a
//! match or pick stop candidates. Policies are a closed enum; dispatch
//! is a match, not a trait object.

use crate::error::EngineError;
use armada_cloud::CapacityBackend;
use armada_core::{
    host_matches, instance_matches, sort_least_idle_first, sort_most_idle_first, CapacityHost,
    Clock, FleetConfig, Platform, RemoteInstance, StopPolicy, TaskProfile, TaskShape,
};
use std::collections::HashMap;
use tracing::debug;

/// Pick a host that can run a task of this profile and shape, or `None`
/// when nothing fits. Choosing a spot instance clears its idle marker so
/// the termination sweep cannot race the placement.
pub async fn instance_for_scheduling<P, C>(
    policy: StopPolicy,
    capacity: &P,
    config: &FleetConfig,
    profile: &TaskProfile,
    shape: &TaskShape,
    clock: &C,
) -> Result<Option<CapacityHost>, EngineError>
where
    P: CapacityBackend,
    C: Clock,
{
    let hosts = capacity.list_hosts(config).await?;
    let mut instances = capacity.instances_for_hosts(config, &hosts).await?;
    instances.retain(|instance| instance.lifecycle.is_schedulable());

    let now_ms = clock.epoch_ms();
    match policy {
        // Pack work onto the newest capacity so the oldest drains out.
        StopPolicy::StopOldest => instances.sort_by_key(|i| std::cmp::Reverse(i.launched_at_ms)),
        // Pack work onto recently-busy capacity so long-idle instances
        // stay stoppable.
        StopPolicy::StopMostIdle => sort_least_idle_first(&mut instances, now_ms),
    }

    let hosts_by_instance: HashMap<&str, &CapacityHost> = hosts
        .iter()
        .map(|host| (host.instance_id.as_str(), host))
        .collect();

    for instance in &instances {
        if !instance_matches(profile, instance) {
            continue;
        }
        let Some(&host) = hosts_by_instance.get(instance.id.as_str()) else {
            continue;
        };
        if !host_matches(host, shape) {
            continue;
        }
        if instance.is_spot() {
            capacity.clear_last_seen_idle(config, &instance.id).await?;
        }
        debug!(host = %host.host_id, instance = %instance.id, "selected host for scheduling");
        return Ok(Some(host.clone()));
    }
    Ok(None)
}

/// Idle on-demand hosts the policy wants stopped, or `None` when the
/// fleet is already at or below its per-platform floor or nothing
/// qualifies. The floor gates entry only; stopped capacity is restarted
/// by the next pass if the fleet dips under its minimum.
pub async fn instances_to_stop<P, C>(
    policy: StopPolicy,
    capacity: &P,
    config: &FleetConfig,
    platform: Platform,
    clock: &C,
) -> Result<Option<Vec<CapacityHost>>, EngineError>
where
    P: CapacityBackend,
    C: Clock,
{
    let hosts = capacity.on_demand_hosts(config).await?;
    let mut instances = capacity.instances_for_hosts(config, &hosts).await?;
    instances.retain(|instance| {
        instance.lifecycle.is_schedulable() && instance.platform == platform && !instance.is_spot()
    });

    let limits = config.limits(platform);
    if instances.len() as u32 <= limits.min_instances {
        return Ok(None);
    }

    let idle_hosts: HashMap<&str, &CapacityHost> = hosts
        .iter()
        .filter(|host| host.is_idle())
        .map(|host| (host.instance_id.as_str(), host))
        .collect();
    instances.retain(|instance| idle_hosts.contains_key(instance.id.as_str()));

    let now_ms = clock.epoch_ms();
    let candidates: Vec<RemoteInstance> = match policy {
        StopPolicy::StopOldest => {
            instances.sort_by_key(|instance| instance.launched_at_ms);
            instances.into_iter().take(1).collect()
        }
        StopPolicy::StopMostIdle => {
            let threshold_ms = limits.stop_idle_after.as_millis() as u64;
            instances.retain(|instance| instance.idle_duration_ms(now_ms) > threshold_ms);
            sort_most_idle_first(&mut instances, now_ms);
            instances
        }
    };

    let chosen: Vec<CapacityHost> = candidates
        .iter()
        .filter_map(|instance| idle_hosts.get(instance.id.as_str()).map(|h| (*h).clone()))
        .collect();

    if chosen.is_empty() {
        Ok(None)
    } else {
        Ok(Some(chosen))
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
