// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failures surfaced by cloud control-plane calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CloudError {
    #[error("cloud api error: {0}")]
    Api(String),
    /// The account or fleet quota would be exceeded; callers report this
    /// rather than retry it.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}
