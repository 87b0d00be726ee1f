// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deduplicating ledger of operator-visible events.
//!
//! Each event carries a fingerprint naming the operation and subject it
//! came from. Re-reporting the same fingerprint refreshes the entry in
//! place, so a recurring failure shows up once, not once per cycle.
//! Entries untouched for thirty minutes expire on their own.

use crate::clock::Clock;
use crate::job::JobIdentity;
use crate::platform::Platform;
use crate::task::TaskProfile;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

const RETENTION: Duration = Duration::from_secs(30 * 60);

/// Identity of an event source: one operation acting on one subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn create_task(job: &JobIdentity) -> Self {
        Fingerprint(format!("create-task:{job}"))
    }

    pub fn for_profile(profile: &TaskProfile) -> Self {
        // Profiles have no natural id; their serialized form is one.
        match serde_json::to_string(profile) {
            Ok(json) => Fingerprint(format!("profile:{json}")),
            Err(_) => Fingerprint(format!("profile:{}/{}", profile.platform, profile.instance_type)),
        }
    }

    pub fn terminate_agent(agent_id: &str) -> Self {
        Fingerprint(format!("terminate-agent:{agent_id}"))
    }

    pub fn refresh_tasks() -> Self {
        Fingerprint("refresh-tasks".to_string())
    }

    pub fn disable_stale_agents() -> Self {
        Fingerprint("disable-stale-agents".to_string())
    }

    pub fn terminate_disabled_agents() -> Self {
        Fingerprint("terminate-disabled-agents".to_string())
    }

    pub fn terminate_unregistered() -> Self {
        Fingerprint("terminate-unregistered".to_string())
    }

    pub fn spot_maintenance() -> Self {
        Fingerprint("spot-maintenance".to_string())
    }

    pub fn terminate_idle_spot() -> Self {
        Fingerprint("terminate-idle-spot".to_string())
    }

    pub fn ensure_cluster_size(platform: Platform) -> Self {
        Fingerprint(format!("ensure-cluster-size:{platform}"))
    }

    pub fn stop_idle_instances(platform: Platform) -> Self {
        Fingerprint(format!("stop-idle-instances:{platform}"))
    }

    pub fn terminate_stopped_instances() -> Self {
        Fingerprint("terminate-stopped-instances".to_string())
    }

    pub fn missing_agents() -> Self {
        Fingerprint("missing-agents".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One operator-visible event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub severity: Severity,
    pub fingerprint: Fingerprint,
    pub message: String,
    pub description: String,
}

impl Event {
    pub fn error(
        fingerprint: Fingerprint,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            fingerprint,
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn warning(
        fingerprint: Fingerprint,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            fingerprint,
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn info(
        fingerprint: Fingerprint,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Info,
            fingerprint,
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

#[derive(Debug)]
struct Entry {
    event: Event,
    last_touched_ms: u64,
}

/// Fingerprint-keyed event store with a thirty-minute retention window.
#[derive(Debug)]
pub struct EventLedger<C: Clock> {
    entries: Mutex<HashMap<Fingerprint, Entry>>,
    clock: C,
}

impl<C: Clock> EventLedger<C> {
    pub fn new(clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Insert or refresh the entry for this event's fingerprint.
    pub fn update(&self, event: Event) {
        let now_ms = self.clock.epoch_ms();
        let mut entries = self.entries.lock();
        Self::sweep(&mut entries, now_ms);
        entries.insert(
            event.fingerprint.clone(),
            Entry {
                event,
                last_touched_ms: now_ms,
            },
        );
    }

    /// Drop the entry for a fingerprint, typically after the operation
    /// that produced it succeeds again.
    pub fn remove(&self, fingerprint: &Fingerprint) {
        self.entries.lock().remove(fingerprint);
    }

    pub fn all(&self) -> Vec<Event> {
        let now_ms = self.clock.epoch_ms();
        let mut entries = self.entries.lock();
        Self::sweep(&mut entries, now_ms);
        entries.values().map(|entry| entry.event.clone()).collect()
    }

    pub fn errors(&self) -> Vec<Event> {
        self.all().into_iter().filter(Event::is_error).collect()
    }

    pub fn warnings(&self) -> Vec<Event> {
        self.all().into_iter().filter(Event::is_warning).collect()
    }

    fn sweep(entries: &mut HashMap<Fingerprint, Entry>, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(RETENTION.as_millis() as u64);
        entries.retain(|_, entry| entry.last_touched_ms >= cutoff);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
