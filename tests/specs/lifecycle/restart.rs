// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart specs
//!
//! The registry owns no durable state; after a process restart the first
//! pass rebuilds it from the control plane, and agents backed by a
//! reconstructed task are not swept as missing.

use crate::prelude::*;

fn description(agent_id: &str, server_id: &str, host_id: Option<&str>) -> TaskDescription {
    TaskDescription {
        agent_id: agent_id.to_string(),
        task_arn: format!("arn:task/{agent_id}"),
        definition_arn: "arn:taskdef/agent:1".to_string(),
        host_id: host_id.map(str::to_string),
        // recent relative to the fixture clock, so the rebuilt task is
        // still inside its registration window
        created_at_ms: 3_500_000,
        job: Some(job(1)),
        profile: Some(linux_profile()),
        server_id: Some(server_id.to_string()),
    }
}

#[tokio::test]
async fn the_first_pass_rebuilds_the_registry_from_the_control_plane() {
    let w = World::new();
    w.capacity.add_host(idle_host("h-1", "i-1"));
    w.capacity.add_instance(linux_instance("i-1"));
    w.tasks.push_task_description(description("task-7", "server-1", Some("h-1")));
    w.server.set_agents(Agents::new(vec![Agent::new(
        "task-7",
        AgentState::Idle,
        BuildState::Idle,
        ConfigState::Enabled,
    )]));

    w.tick().await;

    let registry = w.registry();
    let task = registry.find("task-7").unwrap();
    assert_eq!(task.instance_id.as_deref(), Some("i-1"));
    // the live agent was not treated as missing
    assert!(w.server.deleted().is_empty());
}

#[tokio::test]
async fn foreign_tasks_are_never_adopted() {
    let w = World::new();
    w.tasks.push_task_description(description("task-other", "server-2", None));

    w.tick().await;

    assert_eq!(w.registry().task_count(), 0);
}

#[tokio::test]
async fn an_agent_with_no_backing_task_is_healed_away() {
    let w = World::new();
    w.server.set_agents(Agents::new(vec![Agent::new(
        "task-ghost",
        AgentState::LostContact,
        BuildState::Unknown,
        ConfigState::Enabled,
    )]));

    w.tick().await;

    assert_eq!(w.server.disabled(), vec!["task-ghost"]);
    assert_eq!(w.server.deleted(), vec!["task-ghost"]);
}
