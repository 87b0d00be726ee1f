// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Destination for human-readable progress lines emitted while a task is
//! being created, typically surfaced in the job's console log.

pub trait LogSink: Send + Sync {
    fn accept(&self, line: &str);
}

/// Discards every line. Used by cycles that have no console to write to.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn accept(&self, _line: &str) {}
}

#[cfg(any(test, feature = "test-support"))]
pub use crate::test_support::VecLogSink;
