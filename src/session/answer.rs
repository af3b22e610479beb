use serde::{Deserialize, Serialize};

/// A learner's response to the active question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    /// Index into the question's options.
    Choice(usize),
    Text(String),
    Fragments(Vec<String>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Walkthrough marker: the question was shown through, not graded.
    Completed,
}

/// One entry of the answer log. Appended once per question, never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// 1-based stage ordinal.
    pub stage: u8,
    pub prompt: String,
    pub submitted: String,
    pub expected: String,
    pub outcome: Outcome,
}

impl AnswerRecord {
    pub fn graded(stage: u8, prompt: &str, submitted: &str, expected: &str, correct: bool) -> Self {
        Self {
            stage,
            prompt: prompt.to_string(),
            submitted: submitted.to_string(),
            expected: expected.to_string(),
            outcome: if correct {
                Outcome::Correct
            } else {
                Outcome::Incorrect
            },
        }
    }

    pub fn completed(stage: u8, prompt: &str) -> Self {
        Self {
            stage,
            prompt: prompt.to_string(),
            submitted: String::new(),
            expected: String::new(),
            outcome: Outcome::Completed,
        }
    }

    pub fn is_graded(&self) -> bool {
        self.outcome != Outcome::Completed
    }

    pub fn is_correct(&self) -> bool {
        self.outcome == Outcome::Correct
    }
}

/// Trimmed, lowercased form used for text comparisons.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}
