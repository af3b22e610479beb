use thiserror::Error;

use crate::session::Phase;

/// Errors raised by the practice session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no items available for the selected categories")]
    EmptySelection,
    #[error("item {0:?} has no maskable vowel")]
    NoMaskablePosition(String),
    #[error("{operation} is not allowed while {phase:?}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },
    #[error("answer does not fit the active question")]
    InvalidAnswer,
}

/// Errors raised by per-question material generators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("word {0:?} has no vowel to blank out")]
    NoMaskablePosition(String),
}

impl From<GeneratorError> for SessionError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::NoMaskablePosition(word) => SessionError::NoMaskablePosition(word),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrationError {
    #[error("speech narration is not available")]
    Unavailable,
    #[error("speech backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("embedded asset {0} is missing")]
    MissingAsset(&'static str),
    #[error("failed to parse {asset}: {source}")]
    Parse {
        asset: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
