// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scale-in specs
//!
//! Idle capacity drains in two stages: a pass stops it, a later pass
//! terminates it once it has sat stopped past the window.

use crate::prelude::*;

fn idle_instance(w: &World, id: &str, idle_for: Duration) {
    let mut instance = linux_instance(id);
    let marker = w.clock.epoch_ms() - idle_for.as_millis() as u64;
    instance.tags.insert(LAST_SEEN_IDLE.to_string(), marker.to_string());
    w.capacity.add_instance(instance);
    w.capacity.add_host(idle_host(&format!("h-{id}"), id));
}

#[tokio::test]
async fn idle_capacity_is_stopped_then_terminated() {
    let mut w = World::new();
    w.config.linux.stop_policy = StopPolicy::StopMostIdle;
    idle_instance(&w, "i-1", 10 * MINUTE);

    w.tick().await;
    assert_eq!(w.capacity.stopped(), vec!["i-1"]);
    assert!(w.capacity.terminated().is_empty());

    w.advance(6 * MINUTE);
    w.tick().await;
    assert_eq!(w.capacity.terminated(), vec!["i-1"]);
    assert_eq!(w.capacity.deregistered(), vec!["h-i-1"]);
}

#[tokio::test]
async fn a_stopped_instance_survives_until_its_window_elapses() {
    let mut w = World::new();
    w.config.linux.stop_policy = StopPolicy::StopMostIdle;
    idle_instance(&w, "i-1", 10 * MINUTE);

    w.tick().await;
    w.advance(4 * MINUTE);
    w.tick().await;

    assert!(w.capacity.terminated().is_empty());
}

#[tokio::test]
async fn the_minimum_floor_blocks_the_stop_stage() {
    let mut w = World::new();
    w.config.linux.min_instances = 1;
    w.config.linux.stop_policy = StopPolicy::StopMostIdle;
    idle_instance(&w, "i-1", 30 * MINUTE);

    w.tick().await;

    assert!(w.capacity.stopped().is_empty());
}

#[tokio::test]
async fn oldest_policy_drains_one_instance_per_pass() {
    let mut w = World::new();
    idle_instance(&w, "i-a", MINUTE);
    idle_instance(&w, "i-b", MINUTE);
    if let Some(first) = w.capacity.instances().first() {
        assert_eq!(first.id, "i-a");
    }

    w.tick().await;

    // default policy stops the single oldest idle instance
    assert_eq!(w.capacity.stopped().len(), 1);
}
