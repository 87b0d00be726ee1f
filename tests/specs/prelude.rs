// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for scenario specs: one fleet, fake backends, a
//! controllable clock.

pub use armada_cloud::{
    FakeCapacityBackend, FakeServerBackend, FakeSpotBackend, FakeTaskBackend, TaskDescription,
};
pub use armada_core::clock::FakeClock;
pub use armada_core::test_support::{idle_host, job, linux_instance, linux_profile, spot_instance};
pub use armada_core::{
    Agent, AgentState, Agents, BuildState, Clock, ConfigState, CreateTaskRequest, FleetConfig,
    NullLogSink, Platform, StopPolicy, LAST_SEEN_IDLE, STOPPED_AT,
};
pub use armada_engine::{Reconciler, TaskRegistry};
pub use std::sync::Arc;
pub use std::time::Duration;

pub const MINUTE: Duration = Duration::from_secs(60);

pub type TestReconciler =
    Reconciler<FakeTaskBackend, FakeCapacityBackend, FakeSpotBackend, FakeServerBackend, FakeClock>;
pub type TestRegistry = TaskRegistry<FakeTaskBackend, FakeCapacityBackend, FakeClock>;

pub struct World {
    pub tasks: Arc<FakeTaskBackend>,
    pub capacity: Arc<FakeCapacityBackend>,
    pub spot: Arc<FakeSpotBackend>,
    pub server: Arc<FakeServerBackend>,
    pub clock: FakeClock,
    pub reconciler: TestReconciler,
    pub config: FleetConfig,
}

impl World {
    pub fn new() -> Self {
        let tasks = Arc::new(FakeTaskBackend::new());
        let capacity = Arc::new(FakeCapacityBackend::new());
        let spot = Arc::new(FakeSpotBackend::new());
        let server = Arc::new(FakeServerBackend::new());
        let clock = FakeClock::new();
        clock.set_epoch_ms(60 * 60 * 1000);
        tasks.set_now_ms(clock.epoch_ms());
        let reconciler = Reconciler::new(
            Arc::clone(&tasks),
            Arc::clone(&capacity),
            Arc::clone(&spot),
            Arc::clone(&server),
            clock.clone(),
            "server-1",
        );
        Self {
            tasks,
            capacity,
            spot,
            server,
            clock,
            reconciler,
            config: FleetConfig::new("build"),
        }
    }

    pub async fn tick(&self) {
        self.reconciler.run(std::slice::from_ref(&self.config)).await;
    }

    pub fn registry(&self) -> Arc<TestRegistry> {
        self.reconciler.registry(&self.config.name)
    }

    pub fn advance(&self, duration: Duration) {
        self.clock.advance(duration);
        self.tasks.set_now_ms(self.clock.epoch_ms());
    }
}
