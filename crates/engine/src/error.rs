// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use armada_cloud::CloudError;
use thiserror::Error;

/// Failures raised to direct callers of `create` and `terminate`. The
/// reconciliation loop itself absorbs errors into the event ledger
/// instead of raising them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Cloud(#[from] CloudError),
}
