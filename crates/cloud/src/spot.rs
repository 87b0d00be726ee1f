// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spot-capacity housekeeping.
//!
//! Spot requests are fulfilled asynchronously, so the instances they
//! produce show up untagged and have to be adopted by the fleet after
//! the fact. Which idle spot instances to terminate is decided by the
//! engine; this trait only observes and tags.

use crate::error::CloudError;
use armada_core::{FleetConfig, RemoteInstance};
use async_trait::async_trait;

#[async_trait]
pub trait SpotBackend: Send + Sync {
    /// Adopt fulfilled spot instances by copying the fleet's tags onto
    /// them.
    async fn tag_spot_instances(&self, config: &FleetConfig) -> Result<(), CloudError>;

    /// Stamp the last-seen-idle marker on spot instances observed with
    /// no work and no marker.
    async fn tag_idle_spot_instances(
        &self,
        config: &FleetConfig,
        now_ms: u64,
    ) -> Result<(), CloudError>;

    /// Re-examine open spot requests whose instances never got adopted,
    /// cancelling requests that will never fulfill.
    async fn refresh_untagged_spot_requests(&self, config: &FleetConfig)
        -> Result<(), CloudError>;

    /// Every spot instance belonging to the fleet.
    async fn list_spot_instances(
        &self,
        config: &FleetConfig,
    ) -> Result<Vec<RemoteInstance>, CloudError>;
}
