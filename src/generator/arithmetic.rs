use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Question counts offered by the arithmetic menu.
pub const QUESTION_COUNTS: [usize; 3] = [10, 20, 30];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Largest operand drawn at this level.
    pub fn max_operand(self) -> u32 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => 50,
            Difficulty::Hard => 100,
        }
    }

    pub fn to_key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy (within 20)",
            Difficulty::Medium => "Medium (within 50)",
            Difficulty::Hard => "Hard (within 100)",
        }
    }

    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
        }
    }

    pub fn spoken(self) -> &'static str {
        match self {
            Operator::Add => "plus",
            Operator::Sub => "minus",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub a: u32,
    pub b: u32,
    pub operator: Operator,
    pub answer: u32,
}

impl Problem {
    /// Builds a problem, swapping operands of a subtraction so the answer
    /// stays non-negative.
    pub fn new(a: u32, b: u32, operator: Operator) -> Self {
        let (a, b) = match operator {
            Operator::Sub if a < b => (b, a),
            _ => (a, b),
        };
        let answer = match operator {
            Operator::Add => a + b,
            Operator::Sub => a - b,
        };
        Self {
            a,
            b,
            operator,
            answer,
        }
    }

    pub fn prompt(&self) -> String {
        format!("{} {} {} = ?", self.a, self.operator.symbol(), self.b)
    }

    pub fn spoken(&self) -> String {
        format!("{} {} {}", self.a, self.operator.spoken(), self.b)
    }

    /// Whether `input` parses as the correct integer. Unparseable input is
    /// simply wrong.
    pub fn check(&self, input: &str) -> bool {
        input
            .trim()
            .parse::<i64>()
            .is_ok_and(|value| value == i64::from(self.answer))
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.a, self.operator.symbol(), self.b)
    }
}

pub fn generate_problem<R: Rng + ?Sized>(max_operand: u32, rng: &mut R) -> Problem {
    let max = max_operand.max(1);
    let a = rng.gen_range(1..=max);
    let b = rng.gen_range(1..=max);
    let operator = if rng.gen_bool(0.5) {
        Operator::Add
    } else {
        Operator::Sub
    };
    Problem::new(a, b, operator)
}

pub fn generate_problems<R: Rng + ?Sized>(
    difficulty: Difficulty,
    count: usize,
    rng: &mut R,
) -> Vec<Problem> {
    (0..count)
        .map(|_| generate_problem(difficulty.max_operand(), rng))
        .collect()
}
