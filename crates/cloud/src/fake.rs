// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory backends for tests. State sits behind a mutex so the fakes
//! satisfy the `&self` trait surface; every mutating call records what it
//! did for later assertion.

use crate::capacity::CapacityBackend;
use crate::error::CloudError;
use crate::server::ServerBackend;
use crate::spot::SpotBackend;
use crate::tasks::{TaskBackend, TaskDescription};
use armada_core::{
    Agent, AgentTask, Agents, CapacityHost, ConfigState, CreateTaskRequest, FleetConfig,
    LifecycleState, LogSink, RemoteInstance, TaskProfile, LAST_SEEN_IDLE,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

fn injected() -> CloudError {
    CloudError::Api("injected failure".to_string())
}

#[derive(Default)]
struct TaskState {
    next_task: u64,
    now_ms: u64,
    created: Vec<AgentTask>,
    stopped: Vec<String>,
    listed: Vec<TaskDescription>,
    list_calls: u32,
    fail_create: bool,
    fail_stop_and_cleanup: bool,
    fail_list: bool,
    out_of_capacity: bool,
}

#[derive(Default)]
pub struct FakeTaskBackend {
    state: Mutex<TaskState>,
}

impl FakeTaskBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_now_ms(&self, now_ms: u64) {
        self.state.lock().now_ms = now_ms;
    }

    pub fn fail_create(&self) {
        self.state.lock().fail_create = true;
    }

    pub fn fail_stop_and_cleanup(&self) {
        self.state.lock().fail_stop_and_cleanup = true;
    }

    pub fn fail_list(&self) {
        self.state.lock().fail_list = true;
    }

    /// Make `create` report that nothing can host the task.
    pub fn out_of_capacity(&self) {
        self.state.lock().out_of_capacity = true;
    }

    pub fn push_task_description(&self, description: TaskDescription) {
        self.state.lock().listed.push(description);
    }

    pub fn created(&self) -> Vec<AgentTask> {
        self.state.lock().created.clone()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.state.lock().stopped.clone()
    }

    pub fn list_calls(&self) -> u32 {
        self.state.lock().list_calls
    }
}

#[async_trait]
impl TaskBackend for FakeTaskBackend {
    async fn create(
        &self,
        request: &CreateTaskRequest,
        _config: &FleetConfig,
        log: &dyn LogSink,
    ) -> Result<Option<AgentTask>, CloudError> {
        let mut state = self.state.lock();
        if state.fail_create {
            return Err(injected());
        }
        if state.out_of_capacity {
            log.accept("no instance has capacity for this task");
            return Ok(None);
        }
        state.next_task += 1;
        let n = state.next_task;
        let task = AgentTask {
            agent_id: format!("task-{n}"),
            task_arn: format!("arn:task/{n}"),
            definition_arn: "arn:taskdef/agent:1".to_string(),
            instance_id: Some(format!("i-{n}")),
            created_at_ms: state.now_ms,
            job: request.job.clone(),
            profile: request.profile.clone(),
        };
        log.accept(&format!("created task {} for {}", task.agent_id, task.job));
        state.created.push(task.clone());
        Ok(Some(task))
    }

    async fn stop_and_cleanup(
        &self,
        _config: &FleetConfig,
        task: &AgentTask,
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_stop_and_cleanup {
            return Err(injected());
        }
        state.stopped.push(task.agent_id.clone());
        Ok(())
    }

    async fn list_all_tasks(
        &self,
        _config: &FleetConfig,
    ) -> Result<Vec<TaskDescription>, CloudError> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        if state.fail_list {
            return Err(injected());
        }
        Ok(state.listed.clone())
    }
}

#[derive(Default)]
struct CapacityState {
    hosts: Vec<CapacityHost>,
    instances: Vec<RemoteInstance>,
    next_instance: u64,
    started_or_created: Vec<String>,
    stopped: Vec<String>,
    terminated: Vec<String>,
    deregistered: Vec<String>,
    tag_writes: Vec<(String, String, String)>,
    idle_cleared: Vec<String>,
    list_host_calls: u32,
    fail_start_or_create: bool,
    fail_stop: bool,
    fail_terminate: bool,
}

impl CapacityState {
    fn instance_ids(hosts: &[CapacityHost]) -> Vec<String> {
        hosts.iter().map(|host| host.instance_id.clone()).collect()
    }

    fn is_spot(&self, instance_id: &str) -> bool {
        self.instances
            .iter()
            .any(|instance| instance.id == instance_id && instance.is_spot())
    }
}

#[derive(Default)]
pub struct FakeCapacityBackend {
    state: Mutex<CapacityState>,
}

impl FakeCapacityBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_host(&self, host: CapacityHost) {
        self.state.lock().hosts.push(host);
    }

    pub fn add_instance(&self, instance: RemoteInstance) {
        self.state.lock().instances.push(instance);
    }

    pub fn fail_start_or_create(&self) {
        self.state.lock().fail_start_or_create = true;
    }

    pub fn fail_stop(&self) {
        self.state.lock().fail_stop = true;
    }

    pub fn fail_terminate(&self) {
        self.state.lock().fail_terminate = true;
    }

    pub fn instances(&self) -> Vec<RemoteInstance> {
        self.state.lock().instances.clone()
    }

    pub fn started_or_created(&self) -> Vec<String> {
        self.state.lock().started_or_created.clone()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.state.lock().stopped.clone()
    }

    pub fn terminated(&self) -> Vec<String> {
        self.state.lock().terminated.clone()
    }

    pub fn deregistered(&self) -> Vec<String> {
        self.state.lock().deregistered.clone()
    }

    pub fn tag_writes(&self) -> Vec<(String, String, String)> {
        self.state.lock().tag_writes.clone()
    }

    pub fn idle_cleared(&self) -> Vec<String> {
        self.state.lock().idle_cleared.clone()
    }

    pub fn list_host_calls(&self) -> u32 {
        self.state.lock().list_host_calls
    }
}

#[async_trait]
impl CapacityBackend for FakeCapacityBackend {
    async fn list_hosts(&self, _config: &FleetConfig) -> Result<Vec<CapacityHost>, CloudError> {
        let mut state = self.state.lock();
        state.list_host_calls += 1;
        Ok(state.hosts.clone())
    }

    async fn instances_for_hosts(
        &self,
        _config: &FleetConfig,
        hosts: &[CapacityHost],
    ) -> Result<Vec<RemoteInstance>, CloudError> {
        let state = self.state.lock();
        let ids = CapacityState::instance_ids(hosts);
        Ok(state
            .instances
            .iter()
            .filter(|instance| ids.contains(&instance.id))
            .cloned()
            .collect())
    }

    async fn on_demand_hosts(&self, _config: &FleetConfig) -> Result<Vec<CapacityHost>, CloudError> {
        let state = self.state.lock();
        Ok(state
            .hosts
            .iter()
            .filter(|host| !state.is_spot(&host.instance_id))
            .cloned()
            .collect())
    }

    async fn all_on_demand_instances(
        &self,
        _config: &FleetConfig,
    ) -> Result<Vec<RemoteInstance>, CloudError> {
        let state = self.state.lock();
        Ok(state
            .instances
            .iter()
            .filter(|instance| !instance.is_spot())
            .cloned()
            .collect())
    }

    async fn mark_instance_idle(
        &self,
        _config: &FleetConfig,
        instance_id: &str,
        now_ms: u64,
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        let value = now_ms.to_string();
        for instance in &mut state.instances {
            if instance.id == instance_id {
                instance.tags.insert(LAST_SEEN_IDLE.to_string(), value.clone());
            }
        }
        state
            .tag_writes
            .push((instance_id.to_string(), LAST_SEEN_IDLE.to_string(), value));
        Ok(())
    }

    async fn clear_last_seen_idle(
        &self,
        _config: &FleetConfig,
        instance_id: &str,
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        for instance in &mut state.instances {
            if instance.id == instance_id {
                instance.tags.remove(LAST_SEEN_IDLE);
            }
        }
        state.idle_cleared.push(instance_id.to_string());
        Ok(())
    }

    async fn start_or_create_instances(
        &self,
        config: &FleetConfig,
        profile: &TaskProfile,
        count: u32,
        log: &dyn LogSink,
    ) -> Result<Vec<RemoteInstance>, CloudError> {
        let mut state = self.state.lock();
        if state.fail_start_or_create {
            return Err(injected());
        }
        let mut launched = Vec::new();
        for _ in 0..count {
            state.next_instance += 1;
            let id = format!("i-new-{}", state.next_instance);
            let mut tags = HashMap::new();
            tags.insert("Name".to_string(), config.instance_name(profile.platform));
            let instance = RemoteInstance {
                id: id.clone(),
                platform: profile.platform,
                lifecycle: LifecycleState::Pending,
                launched_at_ms: 0,
                image_id: profile.image_id.clone(),
                instance_type: profile.instance_type.clone(),
                subnet_id: profile.subnet_ids.first().cloned(),
                security_groups: profile.security_groups.clone(),
                spot_request_id: None,
                tags,
            };
            log.accept(&format!("launching instance {id}"));
            state.instances.push(instance.clone());
            state.started_or_created.push(id);
            launched.push(instance);
        }
        Ok(launched)
    }

    async fn tag_instances(
        &self,
        _config: &FleetConfig,
        instance_ids: &[String],
        key: &str,
        value: &str,
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        for instance in &mut state.instances {
            if instance_ids.contains(&instance.id) {
                instance.tags.insert(key.to_string(), value.to_string());
            }
        }
        for id in instance_ids {
            state
                .tag_writes
                .push((id.clone(), key.to_string(), value.to_string()));
        }
        Ok(())
    }

    async fn stop_instances(
        &self,
        _config: &FleetConfig,
        instance_ids: &[String],
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_stop {
            return Err(injected());
        }
        for instance in &mut state.instances {
            if instance_ids.contains(&instance.id) {
                instance.lifecycle = LifecycleState::Stopped;
            }
        }
        state.stopped.extend(instance_ids.iter().cloned());
        Ok(())
    }

    async fn deregister_host(&self, _config: &FleetConfig, host_id: &str) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        for host in &mut state.hosts {
            if host.host_id == host_id {
                host.active = false;
            }
        }
        state.deregistered.push(host_id.to_string());
        Ok(())
    }

    async fn terminate_instances(
        &self,
        _config: &FleetConfig,
        instance_ids: &[String],
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_terminate {
            return Err(injected());
        }
        state.instances.retain(|instance| !instance_ids.contains(&instance.id));
        state.hosts.retain(|host| !instance_ids.contains(&host.instance_id));
        state.terminated.extend(instance_ids.iter().cloned());
        Ok(())
    }
}

#[derive(Default)]
struct SpotState {
    instances: Vec<RemoteInstance>,
    tag_calls: u32,
    idle_tag_calls: u32,
    refresh_calls: u32,
    fail_tag: bool,
    fail_refresh: bool,
    fail_list: bool,
}

#[derive(Default)]
pub struct FakeSpotBackend {
    state: Mutex<SpotState>,
}

impl FakeSpotBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_instance(&self, instance: RemoteInstance) {
        self.state.lock().instances.push(instance);
    }

    pub fn fail_tag(&self) {
        self.state.lock().fail_tag = true;
    }

    pub fn fail_refresh(&self) {
        self.state.lock().fail_refresh = true;
    }

    pub fn fail_list(&self) {
        self.state.lock().fail_list = true;
    }

    pub fn instances(&self) -> Vec<RemoteInstance> {
        self.state.lock().instances.clone()
    }

    pub fn tag_calls(&self) -> u32 {
        self.state.lock().tag_calls
    }

    pub fn idle_tag_calls(&self) -> u32 {
        self.state.lock().idle_tag_calls
    }

    pub fn refresh_calls(&self) -> u32 {
        self.state.lock().refresh_calls
    }
}

#[async_trait]
impl SpotBackend for FakeSpotBackend {
    async fn tag_spot_instances(&self, _config: &FleetConfig) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_tag {
            return Err(injected());
        }
        state.tag_calls += 1;
        Ok(())
    }

    async fn tag_idle_spot_instances(
        &self,
        _config: &FleetConfig,
        now_ms: u64,
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_tag {
            return Err(injected());
        }
        state.idle_tag_calls += 1;
        let value = now_ms.to_string();
        for instance in &mut state.instances {
            if !instance.tags.contains_key(LAST_SEEN_IDLE) {
                instance.tags.insert(LAST_SEEN_IDLE.to_string(), value.clone());
            }
        }
        Ok(())
    }

    async fn refresh_untagged_spot_requests(
        &self,
        _config: &FleetConfig,
    ) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_refresh {
            return Err(injected());
        }
        state.refresh_calls += 1;
        Ok(())
    }

    async fn list_spot_instances(
        &self,
        _config: &FleetConfig,
    ) -> Result<Vec<RemoteInstance>, CloudError> {
        let state = self.state.lock();
        if state.fail_list {
            return Err(injected());
        }
        Ok(state.instances.clone())
    }
}

#[derive(Default)]
struct ServerState {
    agents: Agents,
    disabled: Vec<String>,
    deleted: Vec<String>,
    fail_list: bool,
    fail_disable: bool,
    fail_delete: bool,
}

#[derive(Default)]
pub struct FakeServerBackend {
    state: Mutex<ServerState>,
}

impl FakeServerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_agents(&self, agents: Agents) {
        self.state.lock().agents = agents;
    }

    pub fn fail_list(&self) {
        self.state.lock().fail_list = true;
    }

    pub fn fail_disable(&self) {
        self.state.lock().fail_disable = true;
    }

    pub fn fail_delete(&self) {
        self.state.lock().fail_delete = true;
    }

    pub fn disabled(&self) -> Vec<String> {
        self.state.lock().disabled.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().deleted.clone()
    }
}

#[async_trait]
impl ServerBackend for FakeServerBackend {
    async fn list_agents(&self) -> Result<Agents, CloudError> {
        let state = self.state.lock();
        if state.fail_list {
            return Err(injected());
        }
        Ok(state.agents.clone())
    }

    async fn disable_agents(&self, agents: &[Agent]) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_disable {
            return Err(injected());
        }
        let ids: Vec<String> = agents.iter().map(|agent| agent.agent_id.clone()).collect();
        let roster: Vec<Agent> = state
            .agents
            .clone()
            .into_iter()
            .map(|mut agent| {
                if ids.contains(&agent.agent_id) {
                    agent.config_state = ConfigState::Disabled;
                }
                agent
            })
            .collect();
        state.agents = Agents::new(roster);
        state.disabled.extend(ids);
        Ok(())
    }

    async fn delete_agents(&self, agents: &[Agent]) -> Result<(), CloudError> {
        let mut state = self.state.lock();
        if state.fail_delete {
            return Err(injected());
        }
        let ids: Vec<String> = agents.iter().map(|agent| agent.agent_id.clone()).collect();
        let roster: Vec<Agent> = state
            .agents
            .clone()
            .into_iter()
            .filter(|agent| !ids.contains(&agent.agent_id))
            .collect();
        state.agents = Agents::new(roster);
        state.deleted.extend(ids);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
