// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet configuration: per-platform capacity limits and time windows.

use crate::platform::{Platform, StopPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_max_instances() -> u32 {
    5
}

fn default_stop_idle_after() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_terminate_stopped_after() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_terminate_idle_spot_after() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_auto_register_timeout() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_stop_policy() -> StopPolicy {
    StopPolicy::StopOldest
}

/// Capacity limits and scale-in windows for one platform within a fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLimits {
    /// Floor the fleet never shrinks below, counted per platform.
    #[serde(default)]
    pub min_instances: u32,
    /// Hard cap on instances for this platform.
    #[serde(default = "default_max_instances")]
    pub max_instances: u32,
    #[serde(default = "default_stop_policy")]
    pub stop_policy: StopPolicy,
    /// How long an on-demand instance may sit idle before being stopped.
    #[serde(default = "default_stop_idle_after")]
    pub stop_idle_after: Duration,
    /// How long a stopped instance may linger before termination.
    #[serde(default = "default_terminate_stopped_after")]
    pub terminate_stopped_after: Duration,
    /// How long a spot instance may sit idle before termination. Spot
    /// capacity is never stopped, only terminated.
    #[serde(default = "default_terminate_idle_spot_after")]
    pub terminate_idle_spot_after: Duration,
}

impl Default for PlatformLimits {
    fn default() -> Self {
        Self {
            min_instances: 0,
            max_instances: default_max_instances(),
            stop_policy: default_stop_policy(),
            stop_idle_after: default_stop_idle_after(),
            terminate_stopped_after: default_terminate_stopped_after(),
            terminate_idle_spot_after: default_terminate_idle_spot_after(),
        }
    }
}

/// Configuration for one elastic fleet. A deployment may run several
/// fleets, each reconciled independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub name: String,
    /// Grace period for a freshly created task to register its agent
    /// before the fleet treats it as stale.
    #[serde(default = "default_auto_register_timeout")]
    pub auto_register_timeout: Duration,
    #[serde(default)]
    pub linux: PlatformLimits,
    #[serde(default)]
    pub windows: PlatformLimits,
}

impl FleetConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_register_timeout: default_auto_register_timeout(),
            linux: PlatformLimits::default(),
            windows: PlatformLimits::default(),
        }
    }

    pub fn limits(&self, platform: Platform) -> &PlatformLimits {
        match platform {
            Platform::Linux => &self.linux,
            Platform::Windows => &self.windows,
        }
    }

    /// Name tag stamped on instances launched to hold the minimum-size
    /// floor, e.g. `build_LINUX_INSTANCE`.
    pub fn instance_name(&self, platform: Platform) -> String {
        format!("{}_{}_INSTANCE", self.name, platform.as_str().to_uppercase())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
