// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use armada_cloud::FakeCapacityBackend;
use armada_core::test_support::{idle_host, linux_instance};
use armada_core::FleetConfig;

fn fixture() -> (FakeCapacityBackend, FleetConfig) {
    (FakeCapacityBackend::new(), FleetConfig::new("build"))
}

#[tokio::test]
async fn stop_tags_the_stopped_at_marker_before_stopping() {
    let (capacity, config) = fixture();
    capacity.add_instance(linux_instance("i-1"));

    stop_hosts(&capacity, &config, &[idle_host("h-1", "i-1")], 9_000).await.unwrap();

    let writes = capacity.tag_writes();
    assert_eq!(writes, vec![("i-1".to_string(), STOPPED_AT.to_string(), "9000".to_string())]);
    assert_eq!(capacity.stopped(), vec!["i-1"]);
}

#[tokio::test]
async fn stop_with_no_hosts_touches_nothing() {
    let (capacity, config) = fixture();
    stop_hosts(&capacity, &config, &[], 9_000).await.unwrap();
    assert!(capacity.tag_writes().is_empty());
    assert!(capacity.stopped().is_empty());
}

#[tokio::test]
async fn terminate_deregisters_each_host_then_terminates() {
    let (capacity, config) = fixture();
    capacity.add_instance(linux_instance("i-1"));
    capacity.add_instance(linux_instance("i-2"));
    capacity.add_host(idle_host("h-1", "i-1"));
    capacity.add_host(idle_host("h-2", "i-2"));

    terminate_hosts(&capacity, &config, &[idle_host("h-1", "i-1"), idle_host("h-2", "i-2")])
        .await
        .unwrap();

    assert_eq!(capacity.deregistered(), vec!["h-1", "h-2"]);
    assert_eq!(capacity.terminated(), vec!["i-1", "i-2"]);
    assert!(capacity.instances().is_empty());
}

#[tokio::test]
async fn terminate_with_no_hosts_touches_nothing() {
    let (capacity, config) = fixture();
    terminate_hosts(&capacity, &config, &[]).await.unwrap();
    assert!(capacity.deregistered().is_empty());
    assert!(capacity.terminated().is_empty());
}
