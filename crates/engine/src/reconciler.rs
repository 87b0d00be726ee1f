// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic reconciliation pass.
//!
//! Each fleet is walked through the same sequence every tick: rebuild
//! the registry if needed, disable known agents whose task outlived the
//! registration window, retire agents the server has disabled, reclaim
//! tasks that never produced an agent, then rebalance capacity under the
//! fleet's cleanup lock. Every sub-step is fault isolated; a failure is
//! recorded in the fleet's ledger and the pass moves on. Nothing here
//! retries; the next tick is the retry.

use crate::error::EngineError;
use crate::ops;
use crate::registry::TaskRegistry;
use crate::strategy;
use armada_cloud::{CapacityBackend, ServerBackend, SpotBackend, TaskBackend};
use armada_core::{
    eligible_for_termination, sort_most_idle_first, spot_eligible_for_termination, Agent,
    CapacityHost, Clock, Event, EventLedger, Fingerprint, FleetConfig, LifecycleState, NullLogSink,
    Platform, RemoteInstance, TaskProfile,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

fn record<C: Clock>(
    ledger: &EventLedger<C>,
    fingerprint: Fingerprint,
    message: &str,
    result: Result<(), EngineError>,
) {
    match result {
        Ok(()) => ledger.remove(&fingerprint),
        Err(err) => {
            warn!(step = fingerprint.as_str(), error = %err, "reconciliation sub-step failed");
            ledger.update(Event::error(fingerprint, message, err.to_string()));
        }
    }
}

pub struct Reconciler<T, P, S, U, C: Clock> {
    task_backend: Arc<T>,
    capacity: Arc<P>,
    spot: Arc<S>,
    server: Arc<U>,
    clock: C,
    server_id: String,
    registries: RwLock<HashMap<String, Arc<TaskRegistry<T, P, C>>>>,
    // Ledger for conditions that belong to no single fleet.
    ledger: Arc<EventLedger<C>>,
}

impl<T, P, S, U, C> Reconciler<T, P, S, U, C>
where
    T: TaskBackend,
    P: CapacityBackend,
    S: SpotBackend,
    U: ServerBackend,
    C: Clock,
{
    pub fn new(
        task_backend: Arc<T>,
        capacity: Arc<P>,
        spot: Arc<S>,
        server: Arc<U>,
        clock: C,
        server_id: impl Into<String>,
    ) -> Self {
        let ledger = Arc::new(EventLedger::new(clock.clone()));
        Self {
            task_backend,
            capacity,
            spot,
            server,
            clock,
            server_id: server_id.into(),
            registries: RwLock::new(HashMap::new()),
            ledger,
        }
    }

    pub fn ledger(&self) -> &EventLedger<C> {
        &self.ledger
    }

    /// The registry for a fleet, created on first use.
    pub fn registry(&self, fleet: &str) -> Arc<TaskRegistry<T, P, C>> {
        if let Some(registry) = self.registries.read().get(fleet) {
            return Arc::clone(registry);
        }
        let mut registries = self.registries.write();
        Arc::clone(registries.entry(fleet.to_string()).or_insert_with(|| {
            Arc::new(TaskRegistry::new(
                Arc::clone(&self.task_backend),
                Arc::clone(&self.capacity),
                self.clock.clone(),
                self.server_id.clone(),
            ))
        }))
    }

    /// One full pass over every fleet, then the cross-fleet sweep for
    /// agents the server knows but no registry does.
    pub async fn run(&self, fleets: &[FleetConfig]) {
        for config in fleets {
            self.reconcile_fleet(config).await;
        }
        self.sweep_missing_agents(fleets).await;
    }

    async fn reconcile_fleet(&self, config: &FleetConfig) {
        info!(fleet = %config.name, "reconciling fleet");
        let registry = self.registry(&config.name);
        let ledger = registry.ledger();

        // Refresh records its own ledger entry on failure; a fleet whose
        // registry cannot be rebuilt still gets its capacity steps.
        let _ = registry.refresh_all(config).await;

        record(
            ledger,
            Fingerprint::disable_stale_agents(),
            "failed to disable agents past the registration window",
            self.disable_stale_agents(config, &registry).await,
        );
        record(
            ledger,
            Fingerprint::terminate_disabled_agents(),
            "failed to terminate disabled agents",
            self.terminate_disabled_agents(config, &registry).await,
        );
        record(
            ledger,
            Fingerprint::terminate_unregistered(),
            "failed to terminate unregistered tasks",
            self.terminate_unregistered(config, &registry).await,
        );

        let _cleanup = registry.cleanup_lock().lock().await;
        record(
            ledger,
            Fingerprint::spot_maintenance(),
            "spot housekeeping failed",
            self.spot_maintenance(config).await,
        );
        record(
            ledger,
            Fingerprint::terminate_idle_spot(),
            "failed to terminate idle spot instances",
            self.terminate_idle_spot(config).await,
        );
        for platform in Platform::ALL {
            record(
                ledger,
                Fingerprint::ensure_cluster_size(platform),
                "failed to adjust cluster size",
                self.ensure_cluster_size(config, platform).await,
            );
            record(
                ledger,
                Fingerprint::stop_idle_instances(platform),
                "failed to stop idle instances",
                self.stop_idle(config, platform).await,
            );
        }
        record(
            ledger,
            Fingerprint::terminate_stopped_instances(),
            "failed to terminate stopped instances",
            self.terminate_stopped(config).await,
        );
    }

    /// Step 1: known agents whose task is past the registration grace
    /// period are disabled upstream, so the server hands them no more
    /// work before step 2 retires them. Only reclaimable agents are
    /// touched; a building agent stays enabled however old its task is.
    async fn disable_stale_agents(
        &self,
        config: &FleetConfig,
        registry: &TaskRegistry<T, P, C>,
    ) -> Result<(), EngineError> {
        let known = self.server.list_agents().await?;
        let stale = registry.agents_created_after_timeout(config, &known).to_disable();
        if stale.is_empty() {
            return Ok(());
        }
        info!(fleet = %config.name, count = stale.len(), "disabling agents past the registration window");
        let agents: Vec<Agent> = stale.into_iter().collect();
        self.server.disable_agents(&agents).await?;
        Ok(())
    }

    /// Step 2: agents the server has already disabled and that sit idle
    /// are terminated and deleted upstream.
    async fn terminate_disabled_agents(
        &self,
        config: &FleetConfig,
        registry: &TaskRegistry<T, P, C>,
    ) -> Result<(), EngineError> {
        let known = self.server.list_agents().await?;
        let doomed = known.to_terminate();
        if doomed.is_empty() {
            return Ok(());
        }
        for agent in doomed.iter() {
            // Failures are already in the fleet ledger; keep going.
            let _ = registry.terminate(config, &agent.agent_id).await;
        }
        let agents: Vec<Agent> = doomed.into_iter().collect();
        self.server.delete_agents(&agents).await?;
        Ok(())
    }

    /// Step 3: tasks in the registry the server never heard of.
    async fn terminate_unregistered(
        &self,
        config: &FleetConfig,
        registry: &TaskRegistry<T, P, C>,
    ) -> Result<(), EngineError> {
        let known = self.server.list_agents().await?;
        registry.terminate_unregistered(config, &known).await
    }

    async fn spot_maintenance(&self, config: &FleetConfig) -> Result<(), EngineError> {
        self.spot.tag_spot_instances(config).await?;
        self.spot
            .tag_idle_spot_instances(config, self.clock.epoch_ms())
            .await?;
        self.spot.refresh_untagged_spot_requests(config).await?;
        Ok(())
    }

    async fn terminate_idle_spot(&self, config: &FleetConfig) -> Result<(), EngineError> {
        let now_ms = self.clock.epoch_ms();
        let instances = self.spot.list_spot_instances(config).await?;
        let eligible: Vec<String> = instances
            .iter()
            .filter(|instance| instance.lifecycle.is_schedulable())
            .filter(|instance| spot_eligible_for_termination(config, instance, now_ms))
            .map(|instance| instance.id.clone())
            .collect();
        if eligible.is_empty() {
            return Ok(());
        }
        info!(fleet = %config.name, instances = ?eligible, "terminating idle spot instances");
        self.capacity.terminate_instances(config, &eligible).await?;
        Ok(())
    }

    /// Hold the per-platform floor and ceiling. Below the minimum, ask
    /// for the difference; above the maximum, retire the single most
    /// idle instance per pass.
    async fn ensure_cluster_size(
        &self,
        config: &FleetConfig,
        platform: Platform,
    ) -> Result<(), EngineError> {
        let limits = config.limits(platform);
        let name = config.instance_name(platform);
        let mut instances = self.capacity.all_on_demand_instances(config).await?;
        instances.retain(|instance| {
            instance.platform == platform
                && instance.tag("Name") == Some(name.as_str())
                && !matches!(
                    instance.lifecycle,
                    LifecycleState::Terminated | LifecycleState::ShuttingDown
                )
        });

        let count = instances.len() as u32;
        if count < limits.min_instances {
            let deficit = limits.min_instances - count;
            info!(fleet = %config.name, %platform, deficit, "scaling out to minimum cluster size");
            self.capacity
                .start_or_create_instances(
                    config,
                    &TaskProfile::for_platform(platform),
                    deficit,
                    &NullLogSink,
                )
                .await?;
        } else if count > limits.max_instances {
            if let Some(host) = self.most_idle_host(config, &instances).await? {
                info!(fleet = %config.name, %platform, host = %host.host_id, "scaling in above maximum cluster size");
                ops::terminate_hosts(self.capacity.as_ref(), config, &[host]).await?;
            }
        }
        Ok(())
    }

    async fn most_idle_host(
        &self,
        config: &FleetConfig,
        instances: &[RemoteInstance],
    ) -> Result<Option<CapacityHost>, EngineError> {
        let hosts = self.capacity.on_demand_hosts(config).await?;
        let idle_hosts: HashMap<&str, &CapacityHost> = hosts
            .iter()
            .filter(|host| host.is_idle())
            .map(|host| (host.instance_id.as_str(), host))
            .collect();
        let mut candidates: Vec<RemoteInstance> = instances
            .iter()
            .filter(|instance| {
                instance.lifecycle.is_schedulable() && idle_hosts.contains_key(instance.id.as_str())
            })
            .cloned()
            .collect();
        sort_most_idle_first(&mut candidates, self.clock.epoch_ms());
        Ok(candidates
            .first()
            .and_then(|instance| idle_hosts.get(instance.id.as_str()).map(|h| (*h).clone())))
    }

    async fn stop_idle(&self, config: &FleetConfig, platform: Platform) -> Result<(), EngineError> {
        let policy = config.limits(platform).stop_policy;
        let chosen = strategy::instances_to_stop(
            policy,
            self.capacity.as_ref(),
            config,
            platform,
            &self.clock,
        )
        .await?;
        if let Some(hosts) = chosen {
            ops::stop_hosts(self.capacity.as_ref(), config, &hosts, self.clock.epoch_ms()).await?;
        }
        Ok(())
    }

    async fn terminate_stopped(&self, config: &FleetConfig) -> Result<(), EngineError> {
        let now_ms = self.clock.epoch_ms();
        let instances = self.capacity.all_on_demand_instances(config).await?;
        let eligible: Vec<RemoteInstance> = instances
            .into_iter()
            .filter(|instance| eligible_for_termination(config, instance, now_ms))
            .collect();
        if eligible.is_empty() {
            return Ok(());
        }

        let hosts = self.capacity.list_hosts(config).await?;
        let by_instance: HashMap<&str, &CapacityHost> = hosts
            .iter()
            .map(|host| (host.instance_id.as_str(), host))
            .collect();

        let mut hosted = Vec::new();
        let mut hostless = Vec::new();
        for instance in &eligible {
            match by_instance.get(instance.id.as_str()) {
                Some(host) => hosted.push((*host).clone()),
                None => hostless.push(instance.id.clone()),
            }
        }
        ops::terminate_hosts(self.capacity.as_ref(), config, &hosted).await?;
        if !hostless.is_empty() {
            info!(fleet = %config.name, instances = ?hostless, "terminating stopped instances with no host");
            self.capacity.terminate_instances(config, &hostless).await?;
        }
        Ok(())
    }

    /// Step 5, after every fleet: agents the server knows about that no
    /// registry is tracking are leftovers from tasks that vanished
    /// without normal termination. Disable and delete them upstream.
    /// Skipped while any registry is still unrefreshed, since an empty
    /// unrefreshed registry would make every agent look abandoned.
    async fn sweep_missing_agents(&self, fleets: &[FleetConfig]) {
        for config in fleets {
            if !self.registry(&config.name).is_refreshed().await {
                warn!(fleet = %config.name, "registry not refreshed, skipping missing-agent sweep");
                return;
            }
        }

        let result = self.sweep(fleets).await;
        record(
            &self.ledger,
            Fingerprint::missing_agents(),
            "failed to clean up missing agents",
            result,
        );
    }

    async fn sweep(&self, fleets: &[FleetConfig]) -> Result<(), EngineError> {
        let known = self.server.list_agents().await?;
        let missing: Vec<Agent> = known
            .iter()
            .filter(|agent| {
                !fleets
                    .iter()
                    .any(|config| self.registry(&config.name).has_task(&agent.agent_id))
            })
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        warn!(count = missing.len(), "found agents with no backing task");
        self.server.disable_agents(&missing).await?;
        self.server.delete_agents(&missing).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
