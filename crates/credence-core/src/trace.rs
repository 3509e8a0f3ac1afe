//! Append-only reasoning trace.
//!
//! One trace per pipeline run. Components receive it by `&mut` and can only
//! append; there is no API to edit or drop an entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::AUDIT_TRAIL_SCHEME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceComponent {
    Normalizer,
    Resolver,
    Aggregator,
    TheoryFit,
    CrossModal,
    Pipeline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub seq: u64,
    pub component: TraceComponent,
    pub operation: String,
    /// What the entry is about: a ref id, claim id, or source id.
    pub subject: String,
    pub detail: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningTrace {
    run_id: Uuid,
    entries: Vec<TraceEntry>,
}

impl ReasoningTrace {
    pub fn new() -> Self {
        Self::with_run_id(Uuid::new_v4())
    }

    pub fn with_run_id(run_id: Uuid) -> Self {
        Self {
            run_id,
            entries: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Append an entry and return its sequence number.
    pub fn record(
        &mut self,
        component: TraceComponent,
        operation: impl Into<String>,
        subject: impl Into<String>,
        detail: serde_json::Value,
    ) -> u64 {
        let seq = self.entries.len() as u64;
        self.entries.push(TraceEntry {
            seq,
            component,
            operation: operation.into(),
            subject: subject.into(),
            detail,
            recorded_at: Utc::now(),
        });
        seq
    }

    /// Append every entry of a task-local trace, in order, renumbering sequence ids.
    pub fn absorb(&mut self, other: ReasoningTrace) {
        for mut entry in other.entries {
            entry.seq = self.entries.len() as u64;
            self.entries.push(entry);
        }
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn entries_for<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a TraceEntry> + 'a {
        self.entries.iter().filter(move |e| e.subject == subject)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reference to the slice of this trace concerning `subject`.
    pub fn audit_ref(&self, subject: &str) -> String {
        format!("{AUDIT_TRAIL_SCHEME}:{}/{subject}", self.run_id)
    }
}

impl Default for ReasoningTrace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_preserves_order_and_renumbers() {
        let mut main = ReasoningTrace::new();
        main.record(TraceComponent::Pipeline, "start", "run", serde_json::Value::Null);

        let mut task = ReasoningTrace::new();
        task.record(TraceComponent::Resolver, "cue", "r1", serde_json::Value::Null);
        task.record(TraceComponent::Resolver, "cue", "r2", serde_json::Value::Null);

        main.absorb(task);
        let seqs: Vec<u64> = main.entries().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(main.entries()[2].subject, "r2");
        assert_eq!(main.entries_for("r1").count(), 1);
    }
}
