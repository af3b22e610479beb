pub mod answer;
pub mod flow;
pub mod matching;
pub mod practice;
pub mod question;
pub mod result;

pub use answer::{Answer, AnswerRecord, Outcome};
pub use flow::{FlowConfig, FlowKind, StageKind};
pub use matching::{MatchOutcome, Side};
pub use practice::{Phase, Progress, Session, SessionPlan, Stage};
pub use question::{Question, Verdict};
pub use result::SessionResult;
