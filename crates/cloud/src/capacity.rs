// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance and cluster-host capacity operations.

use crate::error::CloudError;
use armada_core::{CapacityHost, FleetConfig, LogSink, RemoteInstance, TaskProfile};
use async_trait::async_trait;

/// Control-plane operations on the fleet's compute capacity.
#[async_trait]
pub trait CapacityBackend: Send + Sync {
    /// All hosts registered in the fleet's cluster.
    async fn list_hosts(&self, config: &FleetConfig) -> Result<Vec<CapacityHost>, CloudError>;

    /// Instances backing the given hosts, in no particular order.
    async fn instances_for_hosts(
        &self,
        config: &FleetConfig,
        hosts: &[CapacityHost],
    ) -> Result<Vec<RemoteInstance>, CloudError>;

    /// Hosts backed by on-demand instances.
    async fn on_demand_hosts(&self, config: &FleetConfig) -> Result<Vec<CapacityHost>, CloudError>;

    /// Every on-demand instance in the fleet, regardless of cluster
    /// membership or lifecycle state.
    async fn all_on_demand_instances(
        &self,
        config: &FleetConfig,
    ) -> Result<Vec<RemoteInstance>, CloudError>;

    /// Stamp the last-seen-idle marker on an instance.
    async fn mark_instance_idle(
        &self,
        config: &FleetConfig,
        instance_id: &str,
        now_ms: u64,
    ) -> Result<(), CloudError>;

    /// Remove the last-seen-idle marker, typically because the instance
    /// was just chosen to host new work.
    async fn clear_last_seen_idle(
        &self,
        config: &FleetConfig,
        instance_id: &str,
    ) -> Result<(), CloudError>;

    /// Bring `count` instances matching the profile into service,
    /// restarting stopped ones before launching new ones.
    async fn start_or_create_instances(
        &self,
        config: &FleetConfig,
        profile: &TaskProfile,
        count: u32,
        log: &dyn LogSink,
    ) -> Result<Vec<RemoteInstance>, CloudError>;

    async fn tag_instances(
        &self,
        config: &FleetConfig,
        instance_ids: &[String],
        key: &str,
        value: &str,
    ) -> Result<(), CloudError>;

    async fn stop_instances(
        &self,
        config: &FleetConfig,
        instance_ids: &[String],
    ) -> Result<(), CloudError>;

    /// Drain a host out of the cluster so nothing new lands on it.
    async fn deregister_host(&self, config: &FleetConfig, host_id: &str) -> Result<(), CloudError>;

    async fn terminate_instances(
        &self,
        config: &FleetConfig,
        instance_ids: &[String],
    ) -> Result<(), CloudError>;
}
