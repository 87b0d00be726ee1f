// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! armada-cloud: Control-plane contracts the fleet engine drives

pub mod capacity;
pub mod error;
pub mod server;
pub mod spot;
pub mod tasks;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use capacity::CapacityBackend;
pub use error::CloudError;
pub use server::ServerBackend;
pub use spot::SpotBackend;
pub use tasks::{TaskBackend, TaskDescription};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCapacityBackend, FakeServerBackend, FakeSpotBackend, FakeTaskBackend};
