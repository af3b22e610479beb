use serde::{Deserialize, Serialize};

use crate::content::Subject;

/// The practice flows a session can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Dictation,
    FillBlank,
    LongWord,
    Irregular,
    ReadAlong,
    Arithmetic,
}

impl FlowKind {
    pub fn to_key(self) -> &'static str {
        match self {
            FlowKind::Dictation => "dictation",
            FlowKind::FillBlank => "fill_blank",
            FlowKind::LongWord => "long_word",
            FlowKind::Irregular => "irregular",
            FlowKind::ReadAlong => "read_along",
            FlowKind::Arithmetic => "arithmetic",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.to_key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowKind::Dictation => "Dictation",
            FlowKind::FillBlank => "Letter fill-in",
            FlowKind::LongWord => "Long words",
            FlowKind::Irregular => "Irregular words",
            FlowKind::ReadAlong => "Read along",
            FlowKind::Arithmetic => "Arithmetic",
        }
    }

    /// Content subject the flow draws from; arithmetic generates its own.
    pub fn subject(self) -> Option<Subject> {
        match self {
            FlowKind::Dictation | FlowKind::FillBlank => Some(Subject::Phonics),
            FlowKind::LongWord => Some(Subject::LongWords),
            FlowKind::Irregular => Some(Subject::IrregularWords),
            FlowKind::ReadAlong => Some(Subject::ReadAlong),
            FlowKind::Arithmetic => None,
        }
    }

    pub fn all() -> &'static [FlowKind] {
        &[
            FlowKind::Dictation,
            FlowKind::FillBlank,
            FlowKind::LongWord,
            FlowKind::Irregular,
            FlowKind::ReadAlong,
            FlowKind::Arithmetic,
        ]
    }
}

/// Question shape of one stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    Choice,
    Blank,
    Teaching,
    Decoding,
    Combination,
    Matching,
    SentenceFill,
    Puzzle,
    ReadAlong,
    Arithmetic,
}

impl StageKind {
    pub fn label(self) -> &'static str {
        match self {
            StageKind::Choice => "Listen and choose",
            StageKind::Blank => "Fill in the letter",
            StageKind::Teaching => "Syllable teaching",
            StageKind::Decoding => "Decoding",
            StageKind::Combination => "Build the word",
            StageKind::Matching => "Match words and meanings",
            StageKind::SentenceFill => "Complete the sentence",
            StageKind::Puzzle => "Unscramble",
            StageKind::ReadAlong => "Read along",
            StageKind::Arithmetic => "Arithmetic",
        }
    }

    pub fn validator(self) -> Validator {
        match self {
            StageKind::Choice | StageKind::Blank | StageKind::SentenceFill => {
                Validator::OptionIdentity
            }
            StageKind::Puzzle => Validator::CaseInsensitiveText,
            StageKind::Arithmetic => Validator::Integer,
            StageKind::Combination => Validator::Fragments,
            StageKind::Teaching | StageKind::Decoding | StageKind::ReadAlong => {
                Validator::Walkthrough
            }
            StageKind::Matching => Validator::Pairs,
        }
    }

    pub fn completion(self) -> Completion {
        match self {
            StageKind::Matching => Completion::AllPairsMatched,
            _ => Completion::EachItem,
        }
    }

    /// Walkthrough stages are revealed rather than answered.
    pub fn is_walkthrough(self) -> bool {
        self.validator() == Validator::Walkthrough
    }
}

/// How a submitted answer is checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validator {
    /// Index into the generated options, compared by identity.
    OptionIdentity,
    /// Trimmed, lowercased text against the word.
    CaseInsensitiveText,
    /// Parsed integer against the problem's answer.
    Integer,
    /// Joined fragments against the word, case-insensitive.
    Fragments,
    /// No answer; the learner reveals and a completion marker is recorded.
    Walkthrough,
    /// Tile selection on a matching board.
    Pairs,
}

/// When a stage may be left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Every question of the stage revealed.
    EachItem,
    /// The single board question has every pair matched.
    AllPairsMatched,
}

/// Where a flow's candidate items come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolSource {
    /// Union of the chosen categories.
    Categories,
    /// Union of the chosen categories, restricted to words with a vowel.
    MaskableCategories,
    /// Every item of the subject; the selection is ignored.
    Subject(Subject),
    /// Problems generated for the chosen difficulty.
    Problems,
}

/// How the working set is drawn from the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
    /// `min(size, pool)` items without replacement.
    Sample,
    /// The whole pool, shuffled.
    Shuffle,
    /// The whole pool in dataset order.
    InOrder,
}

/// One stage of a flow and the slice of the working set it takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageLayout {
    pub kind: StageKind,
    /// Half-open slice of the working set; `None` takes all of it.
    pub span: Option<(usize, usize)>,
}

impl StageLayout {
    const fn whole(kind: StageKind) -> Self {
        Self { kind, span: None }
    }

    const fn slice(kind: StageKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Some((start, end)),
        }
    }

    /// The part of `len` items this stage takes, clipped to what exists.
    pub fn clip(&self, len: usize) -> (usize, usize) {
        match self.span {
            None => (0, len),
            Some((start, end)) => (start.min(len), end.min(len)),
        }
    }
}

const DICTATION: &[StageLayout] = &[StageLayout::whole(StageKind::Choice)];
const FILL_BLANK: &[StageLayout] = &[StageLayout::whole(StageKind::Blank)];
const LONG_WORD: &[StageLayout] = &[
    StageLayout::slice(StageKind::Teaching, 0, 3),
    StageLayout::slice(StageKind::Decoding, 3, 8),
    StageLayout::slice(StageKind::Combination, 8, 13),
];
const IRREGULAR: &[StageLayout] = &[
    StageLayout::slice(StageKind::Matching, 0, 5),
    StageLayout::slice(StageKind::SentenceFill, 5, 10),
    StageLayout::slice(StageKind::Puzzle, 10, 15),
];
const READ_ALONG: &[StageLayout] = &[StageLayout::whole(StageKind::ReadAlong)];
const ARITHMETIC: &[StageLayout] = &[StageLayout::whole(StageKind::Arithmetic)];

/// Everything that distinguishes one flow from another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowConfig {
    pub kind: FlowKind,
    pub source: PoolSource,
    pub sampling: Sampling,
    pub stages: &'static [StageLayout],
}

impl FlowConfig {
    pub fn for_flow(kind: FlowKind) -> Self {
        let (source, sampling, stages) = match kind {
            FlowKind::Dictation => (PoolSource::Categories, Sampling::Sample, DICTATION),
            FlowKind::FillBlank => (PoolSource::MaskableCategories, Sampling::Sample, FILL_BLANK),
            FlowKind::LongWord => (
                PoolSource::Subject(Subject::LongWords),
                Sampling::Shuffle,
                LONG_WORD,
            ),
            FlowKind::Irregular => (
                PoolSource::Subject(Subject::IrregularWords),
                Sampling::Shuffle,
                IRREGULAR,
            ),
            FlowKind::ReadAlong => (PoolSource::Categories, Sampling::InOrder, READ_ALONG),
            FlowKind::Arithmetic => (PoolSource::Problems, Sampling::InOrder, ARITHMETIC),
        };
        Self {
            kind,
            source,
            sampling,
            stages,
        }
    }
}
