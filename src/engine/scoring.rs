use serde::{Deserialize, Serialize};

use crate::session::answer::{AnswerRecord, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Excellent,
    Good,
    NeedsPractice,
}

impl Tier {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 90 {
            Tier::Excellent
        } else if percentage >= 70 {
            Tier::Good
        } else {
            Tier::NeedsPractice
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent!",
            Tier::Good => "Good job!",
            Tier::NeedsPractice => "Keep practicing!",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTally {
    pub stage: u8,
    pub correct: usize,
    pub total: usize,
    pub completed: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    /// Graded answers only; walkthrough markers are counted in `completed`.
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
    pub tier: Tier,
    pub stages: Vec<StageTally>,
}

/// Tally an answer log. Pure: the same records always give the same score.
///
/// An empty log scores 0. A log holding only walkthrough markers counts as
/// fully completed (100).
pub fn summarize(records: &[AnswerRecord]) -> Score {
    let mut stages: Vec<StageTally> = Vec::new();
    let (mut correct, mut total, mut completed) = (0, 0, 0);

    for record in records {
        let tally = match stages.iter().position(|t| t.stage == record.stage) {
            Some(i) => &mut stages[i],
            None => {
                stages.push(StageTally {
                    stage: record.stage,
                    ..StageTally::default()
                });
                let last = stages.len() - 1;
                &mut stages[last]
            }
        };
        match record.outcome {
            Outcome::Correct => {
                correct += 1;
                total += 1;
                tally.correct += 1;
                tally.total += 1;
            }
            Outcome::Incorrect => {
                total += 1;
                tally.total += 1;
            }
            Outcome::Completed => {
                completed += 1;
                tally.completed += 1;
            }
        }
    }
    stages.sort_by_key(|t| t.stage);

    let percentage = if total > 0 {
        (correct as f64 / total as f64 * 100.0).round() as u32
    } else if completed > 0 {
        100
    } else {
        0
    };

    Score {
        correct,
        total,
        completed,
        percentage,
        tier: Tier::from_percentage(percentage),
        stages,
    }
}
