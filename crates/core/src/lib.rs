// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! armada-core: Domain types and pure policy for the armada fleet engine

pub mod agent;
pub mod clock;
pub mod config;
pub mod event;
pub mod instance;
pub mod job;
pub mod log_sink;
pub mod matcher;
pub mod platform;
pub mod predicate;
pub mod task;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{Agent, AgentState, Agents, BuildState, ConfigState};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{FleetConfig, PlatformLimits};
pub use event::{Event, EventLedger, Fingerprint, Severity};
pub use instance::{
    sort_least_idle_first, sort_most_idle_first, CapacityHost, RemoteInstance, LAST_SEEN_IDLE,
    STOPPED_AT,
};
pub use job::JobIdentity;
pub use log_sink::{LogSink, NullLogSink};
#[cfg(any(test, feature = "test-support"))]
pub use log_sink::VecLogSink;
pub use matcher::{host_matches, instance_matches};
pub use platform::{LifecycleState, Platform, PricingModel, StopPolicy};
pub use predicate::{eligible_for_termination, spot_eligible_for_termination};
pub use task::{AgentTask, CreateTaskRequest, TaskProfile, TaskShape};
