// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spot capacity specs
//!
//! Spot instances are never stopped. A pass stamps the idle marker the
//! first time an instance is seen without work; a later pass terminates
//! it once the marker is old enough.

use crate::prelude::*;

#[tokio::test]
async fn an_idle_spot_instance_is_stamped_then_terminated() {
    let w = World::new();
    w.spot.add_instance(spot_instance("i-spot"));

    w.tick().await;
    // first sighting only stamps the marker
    assert!(w.capacity.terminated().is_empty());
    let stamped = w.spot.instances().remove(0);
    assert_eq!(
        stamped.tag(LAST_SEEN_IDLE),
        Some(w.clock.epoch_ms().to_string().as_str())
    );

    w.advance(31 * MINUTE);
    w.tick().await;
    assert_eq!(w.capacity.terminated(), vec!["i-spot"]);
}

#[tokio::test]
async fn a_spot_instance_idle_within_its_window_is_kept() {
    let w = World::new();
    w.spot.add_instance(spot_instance("i-spot"));

    w.tick().await;
    w.advance(20 * MINUTE);
    w.tick().await;

    assert!(w.capacity.terminated().is_empty());
}

#[tokio::test]
async fn spot_housekeeping_runs_every_pass() {
    let w = World::new();

    w.tick().await;
    w.tick().await;

    assert_eq!(w.spot.tag_calls(), 2);
    assert_eq!(w.spot.refresh_calls(), 2);
    assert_eq!(w.spot.idle_tag_calls(), 2);
}
