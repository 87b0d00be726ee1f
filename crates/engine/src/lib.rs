// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! armada-engine: Task registry, selection strategies and the
//! reconciliation loop

pub mod error;
pub mod ops;
pub mod reconciler;
pub mod registry;
pub mod strategy;

pub use error::EngineError;
pub use reconciler::Reconciler;
pub use registry::TaskRegistry;
pub use strategy::{instance_for_scheduling, instances_to_stop};
