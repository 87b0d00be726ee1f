// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identity: the unit of work an agent task serves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key identifying the job a task was created for.
///
/// Structural equality; this is the idempotency key for task creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity {
    pub pipeline: String,
    pub pipeline_run: u64,
    pub stage: String,
    pub stage_run: String,
    pub job_name: String,
    pub job_id: u64,
}

impl JobIdentity {
    pub fn new(
        pipeline: impl Into<String>,
        pipeline_run: u64,
        stage: impl Into<String>,
        stage_run: impl Into<String>,
        job_name: impl Into<String>,
        job_id: u64,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            pipeline_run,
            stage: stage.into(),
            stage_run: stage_run.into(),
            job_name: job_name.into(),
            job_id,
        }
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.pipeline, self.pipeline_run, self.stage, self.stage_run, self.job_name
        )
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
