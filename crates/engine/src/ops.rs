// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop and terminate sequences over a set of hosts.

use crate::error::EngineError;
use armada_cloud::CapacityBackend;
use armada_core::{CapacityHost, FleetConfig, STOPPED_AT};
use tracing::info;

fn instance_ids(hosts: &[CapacityHost]) -> Vec<String> {
    hosts.iter().map(|host| host.instance_id.clone()).collect()
}

/// Stamp the stopped-at marker, then stop the instances behind these
/// hosts. The marker goes on first so a crash between the two calls
/// leaves an instance that is merely still running, not one that will
/// linger stopped forever.
pub async fn stop_hosts<P: CapacityBackend>(
    capacity: &P,
    config: &FleetConfig,
    hosts: &[CapacityHost],
    now_ms: u64,
) -> Result<(), EngineError> {
    if hosts.is_empty() {
        info!(fleet = %config.name, "no hosts to stop");
        return Ok(());
    }
    let ids = instance_ids(hosts);
    info!(fleet = %config.name, instances = ?ids, "stopping instances");
    capacity
        .tag_instances(config, &ids, STOPPED_AT, &now_ms.to_string())
        .await?;
    capacity.stop_instances(config, &ids).await?;
    Ok(())
}

/// Drain each host out of the cluster, then terminate the instances
/// behind them.
pub async fn terminate_hosts<P: CapacityBackend>(
    capacity: &P,
    config: &FleetConfig,
    hosts: &[CapacityHost],
) -> Result<(), EngineError> {
    if hosts.is_empty() {
        info!(fleet = %config.name, "no hosts to terminate");
        return Ok(());
    }
    for host in hosts {
        capacity.deregister_host(config, &host.host_id).await?;
    }
    let ids = instance_ids(hosts);
    info!(fleet = %config.name, instances = ?ids, "terminating instances");
    capacity.terminate_instances(config, &ids).await?;
    Ok(())
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
