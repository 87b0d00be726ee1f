// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scale-out specs
//!
//! A fleet below its per-platform minimum gains capacity, and repeated
//! passes converge instead of over-provisioning.

use crate::prelude::*;

#[tokio::test]
async fn a_fleet_below_minimum_gains_exactly_the_deficit() {
    let mut w = World::new();
    w.config.linux.min_instances = 2;

    w.tick().await;

    assert_eq!(w.capacity.started_or_created().len(), 2);
    for instance in w.capacity.instances() {
        assert_eq!(
            instance.tag("Name"),
            Some(w.config.instance_name(Platform::Linux).as_str())
        );
    }
}

#[tokio::test]
async fn repeated_passes_do_not_over_provision() {
    let mut w = World::new();
    w.config.linux.min_instances = 2;

    w.tick().await;
    w.advance(MINUTE);
    w.tick().await;
    w.advance(MINUTE);
    w.tick().await;

    assert_eq!(w.capacity.started_or_created().len(), 2);
}

#[tokio::test]
async fn a_repeating_scale_failure_shows_up_once_in_the_ledger() {
    let mut w = World::new();
    w.config.linux.min_instances = 1;
    w.capacity.fail_start_or_create();

    w.tick().await;
    w.advance(MINUTE);
    w.tick().await;

    let errors = w.registry().ledger().errors();
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn platforms_scale_independently() {
    let mut w = World::new();
    w.config.linux.min_instances = 1;
    w.config.windows.min_instances = 2;

    w.tick().await;

    let instances = w.capacity.instances();
    let linux = instances.iter().filter(|i| i.platform == Platform::Linux).count();
    let windows = instances.iter().filter(|i| i.platform == Platform::Windows).count();
    assert_eq!(linux, 1);
    assert_eq!(windows, 2);
}
