// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle specs: creation through retirement.

use crate::prelude::*;

fn agent(agent_id: &str, config_state: ConfigState) -> Agent {
    Agent::new(agent_id, AgentState::Idle, BuildState::Idle, config_state)
}

#[tokio::test]
async fn a_building_agent_rides_out_reconciliation() {
    let w = World::new();
    let registry = w.registry();
    let task = registry
        .create(&CreateTaskRequest::new(job(1), linux_profile()), &w.config, &NullLogSink)
        .await
        .unwrap()
        .unwrap();
    w.server.set_agents(Agents::new(vec![Agent::new(
        task.agent_id.clone(),
        AgentState::Building,
        BuildState::Building,
        ConfigState::Enabled,
    )]));

    w.advance(30 * MINUTE);
    w.tick().await;

    assert!(registry.has_task(&task.agent_id));
    assert!(w.tasks.stopped().is_empty());
    assert!(w.server.deleted().is_empty());
}

#[tokio::test]
async fn an_idle_agent_past_the_registration_window_is_recycled() {
    let w = World::new();
    let registry = w.registry();
    let task = registry
        .create(&CreateTaskRequest::new(job(1), linux_profile()), &w.config, &NullLogSink)
        .await
        .unwrap()
        .unwrap();
    w.server.set_agents(Agents::new(vec![agent(&task.agent_id, ConfigState::Enabled)]));

    w.advance(11 * MINUTE);
    w.tick().await;

    // disabled in step 1, then terminated and deleted in step 2
    assert!(w.server.disabled().contains(&task.agent_id));
    assert!(w.tasks.stopped().contains(&task.agent_id));
    assert!(w.server.deleted().contains(&task.agent_id));
    assert!(!registry.has_task(&task.agent_id));
}

#[tokio::test]
async fn a_disabled_agent_is_retired_on_the_next_pass() {
    let w = World::new();
    let registry = w.registry();
    let task = registry
        .create(&CreateTaskRequest::new(job(1), linux_profile()), &w.config, &NullLogSink)
        .await
        .unwrap()
        .unwrap();
    w.server.set_agents(Agents::new(vec![agent(&task.agent_id, ConfigState::Disabled)]));

    w.tick().await;

    assert!(!registry.has_task(&task.agent_id));
    assert_eq!(w.tasks.stopped(), vec![task.agent_id.clone()]);
    assert_eq!(w.server.deleted(), vec![task.agent_id]);
}

#[tokio::test]
async fn a_task_that_never_registers_is_reclaimed_after_the_grace_period() {
    let w = World::new();
    let registry = w.registry();
    let task = registry
        .create(&CreateTaskRequest::new(job(1), linux_profile()), &w.config, &NullLogSink)
        .await
        .unwrap()
        .unwrap();

    // within the grace period nothing happens
    w.advance(9 * MINUTE);
    w.tick().await;
    assert!(registry.has_task(&task.agent_id));

    w.advance(2 * MINUTE);
    w.tick().await;
    assert!(!registry.has_task(&task.agent_id));
    assert!(w.tasks.stopped().contains(&task.agent_id));
    // never registered, so there was nothing upstream to disable
    assert!(w.server.disabled().is_empty());
}

#[tokio::test]
async fn duplicate_creation_is_satisfied_from_the_registry() {
    let w = World::new();
    let registry = w.registry();
    let request = CreateTaskRequest::new(job(1), linux_profile());

    let first = registry.create(&request, &w.config, &NullLogSink).await.unwrap();
    let second = registry.create(&request, &w.config, &NullLogSink).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(w.tasks.created().len(), 1);
}

#[tokio::test]
async fn no_capacity_is_reported_not_raised() {
    let w = World::new();
    w.tasks.out_of_capacity();
    let registry = w.registry();

    let result = registry
        .create(&CreateTaskRequest::new(job(1), linux_profile()), &w.config, &NullLogSink)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(registry.ledger().warnings().len(), 1);
}
