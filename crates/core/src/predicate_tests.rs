// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::instance::{LAST_SEEN_IDLE, STOPPED_AT};
use crate::platform::{LifecycleState, Platform};
use std::collections::HashMap;
use yare::parameterized;

const MINUTE_MS: u64 = 60 * 1000;

fn instance(lifecycle: LifecycleState, tag: Option<(&str, u64)>) -> RemoteInstance {
    let mut tags = HashMap::new();
    if let Some((key, value)) = tag {
        tags.insert(key.to_string(), value.to_string());
    }
    RemoteInstance {
        id: "i-1".to_string(),
        platform: Platform::Linux,
        lifecycle,
        launched_at_ms: 0,
        image_id: "ami-1".to_string(),
        instance_type: "t3.large".to_string(),
        subnet_id: None,
        security_groups: vec![],
        spot_request_id: None,
        tags,
    }
}

// Default windows: terminate stopped after 5 min, idle spot after 30 min.
fn config() -> FleetConfig {
    FleetConfig::new("build")
}

#[test]
fn stopped_six_minutes_ago_is_eligible() {
    let now = 10 * MINUTE_MS;
    let inst = instance(LifecycleState::Stopped, Some((STOPPED_AT, 4 * MINUTE_MS)));
    assert!(eligible_for_termination(&config(), &inst, now));
}

#[test]
fn stopped_four_minutes_ago_is_not_eligible() {
    let now = 10 * MINUTE_MS;
    let inst = instance(LifecycleState::Stopped, Some((STOPPED_AT, 6 * MINUTE_MS)));
    assert!(!eligible_for_termination(&config(), &inst, now));
}

#[test]
fn stopped_without_marker_is_immediately_eligible() {
    let inst = instance(LifecycleState::Stopped, None);
    assert!(eligible_for_termination(&config(), &inst, 10 * MINUTE_MS));
}

#[parameterized(
    pending = { LifecycleState::Pending },
    running = { LifecycleState::Running },
    stopping = { LifecycleState::Stopping },
    shutting_down = { LifecycleState::ShuttingDown },
    terminated = { LifecycleState::Terminated },
)]
fn non_stopped_states_are_never_eligible(lifecycle: LifecycleState) {
    let inst = instance(lifecycle, Some((STOPPED_AT, 0)));
    assert!(!eligible_for_termination(&config(), &inst, 100 * MINUTE_MS));
}

#[test]
fn a_stopping_instance_without_a_marker_is_left_to_finish_stopping() {
    let inst = instance(LifecycleState::Stopping, None);
    assert!(!eligible_for_termination(&config(), &inst, 10 * MINUTE_MS));
}

#[test]
fn spot_idle_past_the_window_is_eligible() {
    let now = 40 * MINUTE_MS;
    let inst = instance(LifecycleState::Running, Some((LAST_SEEN_IDLE, 5 * MINUTE_MS)));
    assert!(spot_eligible_for_termination(&config(), &inst, now));
}

#[test]
fn spot_idle_within_the_window_is_not_eligible() {
    let now = 40 * MINUTE_MS;
    let inst = instance(LifecycleState::Running, Some((LAST_SEEN_IDLE, 20 * MINUTE_MS)));
    assert!(!spot_eligible_for_termination(&config(), &inst, now));
}

#[test]
fn spot_never_observed_idle_is_never_eligible() {
    let inst = instance(LifecycleState::Running, None);
    assert!(!spot_eligible_for_termination(&config(), &inst, 1000 * MINUTE_MS));
}

#[test]
fn windows_come_from_the_instance_platform() {
    let mut config = config();
    config.windows.terminate_stopped_after = std::time::Duration::from_secs(60 * 60);

    let mut inst = instance(LifecycleState::Stopped, Some((STOPPED_AT, 4 * MINUTE_MS)));
    inst.platform = Platform::Windows;
    assert!(!eligible_for_termination(&config, &inst, 10 * MINUTE_MS));
}
