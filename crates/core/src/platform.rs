// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform, pricing and lifecycle enums for remote instances.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating-system platform of a remote instance. Closed set; boot and
/// teardown costs differ enough that every time window is configured per
/// platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Linux, Platform::Windows];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing model of a remote instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingModel {
    OnDemand,
    Spot,
}

/// Lifecycle state of a remote instance as reported by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
}

impl LifecycleState {
    /// Whether an instance in this state can accept new tasks.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, LifecycleState::Pending | LifecycleState::Running)
    }

    /// Whether the instance has fully stopped. A stopping instance is
    /// not yet stopped; cleanup waits for the state to settle.
    pub fn is_stopped(&self) -> bool {
        matches!(self, LifecycleState::Stopped)
    }
}

/// Scale-in policy selecting which idle instances to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopPolicy {
    /// Stop the single oldest idle instance; needs no tag bookkeeping and
    /// caps instance age.
    StopOldest,
    /// Stop every instance idle for longer than the configured window;
    /// minimizes churn of warm capacity.
    StopMostIdle,
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
