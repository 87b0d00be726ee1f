// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet-scoped registry of agent tasks.
//!
//! The registry is the in-memory source of truth for which tasks this
//! server created. It owns nothing remotely; after a restart the whole
//! map is rebuilt from the control plane by [`TaskRegistry::refresh_all`].

use crate::error::EngineError;
use armada_cloud::{CapacityBackend, TaskBackend};
use armada_core::{
    AgentTask, Agents, Clock, CreateTaskRequest, Event, EventLedger, Fingerprint, FleetConfig,
    JobIdentity, LogSink, Platform,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct TaskRegistry<T, P, C: Clock> {
    // Never held across an await.
    tasks: RwLock<HashMap<String, AgentTask>>,
    ledger: Arc<EventLedger<C>>,
    clock: C,
    server_id: String,
    task_backend: Arc<T>,
    capacity: Arc<P>,
    // Creation serializes per platform so two concurrent requests for
    // the same job cannot both pass the duplicate check. Requests for
    // different platforms proceed in parallel.
    linux_create_lock: tokio::sync::Mutex<()>,
    windows_create_lock: tokio::sync::Mutex<()>,
    // True once the registry has been rebuilt from the control plane.
    refreshed: tokio::sync::Mutex<bool>,
    // Taken by the reconciliation loop around the scale/stop/terminate
    // sequence for this fleet.
    cleanup_lock: tokio::sync::Mutex<()>,
}

impl<T, P, C> TaskRegistry<T, P, C>
where
    T: TaskBackend,
    P: CapacityBackend,
    C: Clock,
{
    pub fn new(
        task_backend: Arc<T>,
        capacity: Arc<P>,
        clock: C,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            ledger: Arc::new(EventLedger::new(clock.clone())),
            clock,
            server_id: server_id.into(),
            task_backend,
            capacity,
            linux_create_lock: tokio::sync::Mutex::new(()),
            windows_create_lock: tokio::sync::Mutex::new(()),
            refreshed: tokio::sync::Mutex::new(false),
            cleanup_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn create_lock(&self, platform: Platform) -> &tokio::sync::Mutex<()> {
        match platform {
            Platform::Linux => &self.linux_create_lock,
            Platform::Windows => &self.windows_create_lock,
        }
    }

    pub fn ledger(&self) -> &EventLedger<C> {
        &self.ledger
    }

    pub fn cleanup_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.cleanup_lock
    }

    /// Create a task for the request's job, or hand back the one that
    /// already serves it. `Ok(None)` means no capacity fits right now.
    pub async fn create(
        &self,
        request: &CreateTaskRequest,
        config: &FleetConfig,
        log: &dyn LogSink,
    ) -> Result<Option<AgentTask>, EngineError> {
        let _guard = self.create_lock(request.profile.platform).lock().await;

        if let Some(existing) = self.find_by_job(&request.job) {
            log.accept(&format!(
                "job {} already has task {}, reusing it",
                request.job, existing.agent_id
            ));
            return Ok(Some(existing));
        }

        match self.task_backend.create(request, config, log).await? {
            Some(task) => {
                info!(agent_id = %task.agent_id, job = %task.job, "created agent task");
                self.tasks.write().insert(task.agent_id.clone(), task.clone());
                Ok(Some(task))
            }
            None => {
                warn!(job = %request.job, "no capacity for task");
                self.ledger.update(Event::warning(
                    Fingerprint::for_profile(&request.profile),
                    "no capacity available",
                    format!("could not place a task for job {}", request.job),
                ));
                Ok(None)
            }
        }
    }

    /// Stop the task remotely and forget it locally. The local removal
    /// happens even when the remote call fails; the error is recorded in
    /// the ledger and still returned to the caller.
    pub async fn terminate(&self, config: &FleetConfig, agent_id: &str) -> Result<(), EngineError> {
        let task = self.tasks.read().get(agent_id).cloned();
        let Some(task) = task else {
            warn!(agent_id, "terminate requested for an agent this registry does not track");
            self.ledger.remove(&Fingerprint::terminate_agent(agent_id));
            return Ok(());
        };

        let remote = self.stop_remote(config, &task).await;

        self.tasks.write().remove(agent_id);

        let fingerprint = Fingerprint::terminate_agent(agent_id);
        match remote {
            Ok(()) => {
                self.ledger.remove(&fingerprint);
                Ok(())
            }
            Err(err) => {
                self.ledger.update(Event::error(
                    fingerprint,
                    format!("failed to terminate task {agent_id}"),
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }

    async fn stop_remote(&self, config: &FleetConfig, task: &AgentTask) -> Result<(), EngineError> {
        self.task_backend.stop_and_cleanup(config, task).await?;
        // Serverless placements have no dedicated instance to hand back.
        if let Some(instance_id) = &task.instance_id {
            self.capacity
                .mark_instance_idle(config, instance_id, self.clock.epoch_ms())
                .await?;
        }
        Ok(())
    }

    /// Terminate tasks that never registered an agent within the grace
    /// period. Individual failures are already ledgered by `terminate`
    /// and do not stop the sweep.
    pub async fn terminate_unregistered(
        &self,
        config: &FleetConfig,
        known: &Agents,
    ) -> Result<(), EngineError> {
        let now_ms = self.clock.epoch_ms();
        let timeout_ms = config.auto_register_timeout.as_millis() as u64;
        let known_ids = known.agent_ids();
        let unregistered: Vec<AgentTask> = self
            .tasks
            .read()
            .values()
            .filter(|task| !known_ids.contains(&task.agent_id))
            .filter(|task| now_ms > task.created_at_ms + timeout_ms)
            .cloned()
            .collect();
        for task in unregistered {
            info!(agent_id = %task.agent_id, "terminating task that never registered");
            let _ = self.terminate(config, &task.agent_id).await;
        }
        Ok(())
    }

    /// Known agents whose backing task's age strictly exceeds the
    /// auto-register timeout. An agent exactly at the boundary is not
    /// included; agents no registry task backs never are.
    pub fn agents_created_after_timeout(&self, config: &FleetConfig, known: &Agents) -> Agents {
        let now_ms = self.clock.epoch_ms();
        let timeout_ms = config.auto_register_timeout.as_millis() as u64;
        let tasks = self.tasks.read();
        Agents::new(
            known
                .iter()
                .filter(|agent| {
                    tasks
                        .get(&agent.agent_id)
                        .map_or(false, |task| now_ms > task.created_at_ms + timeout_ms)
                })
                .cloned()
                .collect(),
        )
    }

    /// Rebuild the task map from the control plane. Runs the underlying
    /// list calls at most once per registry; later calls are no-ops.
    pub async fn refresh_all(&self, config: &FleetConfig) -> Result<(), EngineError> {
        let mut refreshed = self.refreshed.lock().await;
        if *refreshed {
            return Ok(());
        }

        let fingerprint = Fingerprint::refresh_tasks();
        match self.refresh(config).await {
            Ok(count) => {
                info!(fleet = %config.name, count, "rebuilt task registry");
                *refreshed = true;
                self.ledger.remove(&fingerprint);
                Ok(())
            }
            Err(err) => {
                self.ledger.update(Event::error(
                    fingerprint,
                    "failed to refresh tasks",
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }

    async fn refresh(&self, config: &FleetConfig) -> Result<usize, EngineError> {
        let hosts = self.capacity.list_hosts(config).await?;
        let instance_by_host: HashMap<String, String> = hosts
            .into_iter()
            .map(|host| (host.host_id, host.instance_id))
            .collect();

        let descriptions = self.task_backend.list_all_tasks(config).await?;
        let mut count = 0;
        let mut tasks = self.tasks.write();
        for description in descriptions {
            if description.server_id.as_deref() != Some(self.server_id.as_str()) {
                continue;
            }
            let (Some(job), Some(profile)) = (description.job, description.profile) else {
                continue;
            };
            let instance_id = description
                .host_id
                .and_then(|host_id| instance_by_host.get(&host_id).cloned());
            let task = AgentTask {
                agent_id: description.agent_id.clone(),
                task_arn: description.task_arn,
                definition_arn: description.definition_arn,
                instance_id,
                created_at_ms: description.created_at_ms,
                job,
                profile,
            };
            tasks.insert(description.agent_id, task);
            count += 1;
        }
        Ok(count)
    }

    /// Whether the registry has been rebuilt from the control plane
    /// since construction.
    pub async fn is_refreshed(&self) -> bool {
        *self.refreshed.lock().await
    }

    pub fn find(&self, agent_id: &str) -> Option<AgentTask> {
        self.tasks.read().get(agent_id).cloned()
    }

    pub fn find_by_job(&self, job: &JobIdentity) -> Option<AgentTask> {
        self.tasks.read().values().find(|task| &task.job == job).cloned()
    }

    pub fn has_task(&self, agent_id: &str) -> bool {
        self.tasks.read().contains_key(agent_id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.read().len()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
