use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::scoring::{Score, summarize};
use crate::session::answer::AnswerRecord;
use crate::session::flow::FlowKind;

/// Summary of a finished session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub flow: FlowKind,
    pub score: Score,
    pub records: Vec<AnswerRecord>,
    pub completed_at: DateTime<Utc>,
}

impl SessionResult {
    pub fn new(flow: FlowKind, records: &[AnswerRecord], completed_at: DateTime<Utc>) -> Self {
        Self {
            flow,
            score: summarize(records),
            records: records.to_vec(),
            completed_at,
        }
    }

    /// Graded answers that were wrong, in the order they were given.
    pub fn mistakes(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.records
            .iter()
            .filter(|r| r.is_graded() && !r.is_correct())
    }
}
