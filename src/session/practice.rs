use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::content::{ContentProvider, Item, Subject, day_from_key, day_key};
use crate::engine::scoring::{Score, summarize};
use crate::error::SessionError;
use crate::generator::arithmetic::{Difficulty, Problem, generate_problems};
use crate::generator::blank::has_maskable_position;
use crate::narration::Cue;
use crate::session::answer::{Answer, AnswerRecord};
use crate::session::flow::{Completion, FlowConfig, FlowKind, PoolSource, Sampling, StageKind};
use crate::session::matching::{MatchOutcome, Side};
use crate::session::question::{Question, Verdict};
use crate::session::result::SessionResult;

pub const DEFAULT_SESSION_SIZE: usize = 10;
pub const READ_ALONG_DAYS: u32 = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Menu, no session.
    Idle,
    /// Flow chosen, categories being picked.
    Selecting,
    /// Question generated, not yet shown.
    Presenting,
    AwaitingAnswer,
    /// Answer checked (or walkthrough shown); waiting for `advance`.
    Revealed,
    Completed,
}

impl Phase {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Phase::Presenting | Phase::AwaitingAnswer | Phase::Revealed
        )
    }
}

/// What to practice: the flow, the chosen categories and the working-set size.
///
/// For arithmetic the category is the difficulty key and `size` the question
/// count; for read-along the category is the day key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionPlan {
    pub flow: FlowKind,
    pub categories: Vec<String>,
    pub size: usize,
}

impl SessionPlan {
    pub fn new(flow: FlowKind, categories: &[&str], size: usize) -> Self {
        Self {
            flow,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            size,
        }
    }

    pub fn arithmetic(difficulty: Difficulty, count: usize) -> Self {
        Self::new(FlowKind::Arithmetic, &[difficulty.to_key()], count)
    }

    pub fn read_along(day: u32) -> Self {
        Self {
            flow: FlowKind::ReadAlong,
            categories: vec![day_key(day)],
            size: 0,
        }
    }
}

/// One stage's slice of the working set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stage {
    pub kind: StageKind,
    pub items: Vec<Item>,
    pub problems: Vec<Problem>,
}

impl Stage {
    pub fn question_count(&self) -> usize {
        match self.kind {
            StageKind::Matching => usize::from(!self.items.is_empty()),
            StageKind::Arithmetic => self.problems.len(),
            _ => self.items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.question_count() == 0
    }
}

/// Position within the session. `stage` is 1-based, `index` 0-based within
/// the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub stage: usize,
    pub stage_count: usize,
    pub index: usize,
    pub total: usize,
    pub answered: usize,
}

/// The practice session state machine.
///
/// Every flow runs through the same transitions; what differs (pool,
/// stages, question shape, answer check, stage completion) comes from its
/// [`FlowConfig`].
pub struct Session {
    phase: Phase,
    config: Option<FlowConfig>,
    plan: Option<SessionPlan>,
    selecting: Option<FlowKind>,
    selection: Vec<String>,
    stages: Vec<Stage>,
    stage: usize,
    index: usize,
    question: Option<Question>,
    records: Vec<AnswerRecord>,
    option_pool: Vec<Item>,
    completed_at: Option<DateTime<Utc>>,
    rng: Box<dyn RngCore>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_rng(Box::new(SmallRng::from_entropy()))
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(Box::new(SmallRng::seed_from_u64(seed)))
    }

    pub fn with_rng(rng: Box<dyn RngCore>) -> Self {
        Self {
            phase: Phase::Idle,
            config: None,
            plan: None,
            selecting: None,
            selection: Vec::new(),
            stages: Vec::new(),
            stage: 0,
            index: 0,
            question: None,
            records: Vec::new(),
            option_pool: Vec::new(),
            completed_at: None,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn flow(&self) -> Option<FlowKind> {
        self.config.map(|c| c.kind).or(self.selecting)
    }

    pub fn plan(&self) -> Option<&SessionPlan> {
        self.plan.as_ref()
    }

    // ---- selection ----

    /// Open category selection for `flow`.
    pub fn begin_selection(&mut self, flow: FlowKind) -> Result<(), SessionError> {
        self.require("begin_selection", &[Phase::Idle, Phase::Selecting, Phase::Completed])?;
        self.discard();
        self.selecting = Some(flow);
        self.selection.clear();
        self.phase = Phase::Selecting;
        Ok(())
    }

    /// Add or remove a category. Returns whether it is now selected.
    pub fn toggle_category(&mut self, key: &str) -> Result<bool, SessionError> {
        self.require("toggle_category", &[Phase::Selecting])?;
        if let Some(pos) = self.selection.iter().position(|k| k == key) {
            self.selection.remove(pos);
            Ok(false)
        } else {
            self.selection.push(key.to_string());
            Ok(true)
        }
    }

    /// Select every category of the flow's subject.
    pub fn select_all(&mut self, provider: &dyn ContentProvider) -> Result<(), SessionError> {
        self.require("select_all", &[Phase::Selecting])?;
        self.selection = self
            .selecting
            .and_then(FlowKind::subject)
            .map(|subject| category_keys(provider, subject))
            .unwrap_or_default();
        Ok(())
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Start the flow being selected with the current selection.
    pub fn start_selected(
        &mut self,
        provider: &dyn ContentProvider,
        size: usize,
    ) -> Result<(), SessionError> {
        let Some(flow) = self.selecting else {
            return Err(self.invalid("start_selected"));
        };
        let plan = SessionPlan {
            flow,
            categories: self.selection.clone(),
            size,
        };
        self.start(provider, plan)
    }

    // ---- lifecycle ----

    /// Sample the working set and present the first question.
    ///
    /// On `EmptySelection` (or an item that cannot be turned into a question)
    /// the session falls back to `Selecting` with the plan's categories
    /// still chosen.
    pub fn start(
        &mut self,
        provider: &dyn ContentProvider,
        plan: SessionPlan,
    ) -> Result<(), SessionError> {
        self.discard();
        let config = FlowConfig::for_flow(plan.flow);
        match self.prepare(provider, &config, &plan) {
            Ok(()) => {
                tracing::info!(
                    flow = plan.flow.to_key(),
                    categories = ?plan.categories,
                    stages = self.stages.len(),
                    "practice session started"
                );
                self.config = Some(config);
                self.plan = Some(plan);
                self.phase = Phase::Presenting;
                Ok(())
            }
            Err(err) => {
                tracing::info!(flow = plan.flow.to_key(), error = %err, "session could not start");
                self.discard();
                self.selecting = Some(plan.flow);
                self.selection = plan.categories.clone();
                self.plan = Some(plan);
                self.phase = Phase::Selecting;
                Err(err)
            }
        }
    }

    /// Start again with the last plan, sampling a fresh working set. With no
    /// categories chosen, every category of the subject is used.
    pub fn restart(&mut self, provider: &dyn ContentProvider) -> Result<(), SessionError> {
        let Some(mut plan) = self.plan.clone() else {
            return Err(self.invalid("restart"));
        };
        if plan.categories.is_empty() {
            if let Some(subject) = plan.flow.subject() {
                plan.categories = category_keys(provider, subject);
            }
        }
        self.start(provider, plan)
    }

    /// Read along a different day than the current one, picked uniformly.
    pub fn restart_with_other_day(
        &mut self,
        provider: &dyn ContentProvider,
    ) -> Result<(), SessionError> {
        let current = self
            .plan
            .as_ref()
            .filter(|p| p.flow == FlowKind::ReadAlong)
            .and_then(|p| p.categories.first())
            .and_then(|key| day_from_key(key))
            .unwrap_or(1);
        let others: Vec<u32> = provider
            .list_categories(Subject::ReadAlong)
            .iter()
            .filter_map(|c| day_from_key(&c.key))
            .filter(|&day| day != current)
            .collect();
        let Some(&day) = others.choose(&mut *self.rng) else {
            return Err(SessionError::EmptySelection);
        };
        self.start(provider, SessionPlan::read_along(day))
    }

    /// Back to the menu. The answer log is discarded; the last plan is kept
    /// for a later restart.
    pub fn go_to_menu(&mut self) {
        self.discard();
        self.selecting = None;
        self.selection.clear();
        self.phase = Phase::Idle;
    }

    /// Back to category selection with the last plan's choices.
    pub fn reset(&mut self) {
        self.discard();
        if let Some(plan) = &self.plan {
            self.selecting = Some(plan.flow);
            self.selection = plan.categories.clone();
        }
        self.phase = Phase::Selecting;
    }

    // ---- question flow ----

    /// Show the current question. Returns the narration to play.
    pub fn present(&mut self) -> Result<Option<Cue>, SessionError> {
        self.require("present", &[Phase::Presenting])?;
        self.phase = Phase::AwaitingAnswer;
        Ok(self.question.as_ref().and_then(Question::cue))
    }

    /// Check and record an answer.
    ///
    /// A second submission while the answer is revealed is ignored and
    /// returns `Ok(None)`.
    pub fn submit_answer(&mut self, answer: Answer) -> Result<Option<Verdict>, SessionError> {
        if self.phase == Phase::Revealed {
            return Ok(None);
        }
        self.require("submit_answer", &[Phase::AwaitingAnswer])?;
        let question = self.question.as_ref().ok_or(SessionError::InvalidAnswer)?;
        let verdict = question.check(&answer)?;
        let record = AnswerRecord::graded(
            self.stage_ordinal(),
            &question.prompt(),
            &verdict.submitted,
            &question.expected(),
            verdict.correct,
        );
        tracing::debug!(prompt = %record.prompt, correct = verdict.correct, "answer recorded");
        self.records.push(record);
        self.phase = Phase::Revealed;
        Ok(Some(verdict))
    }

    /// Toggle a fragment of a combination question.
    pub fn toggle_fragment(&mut self, index: usize) -> Result<bool, SessionError> {
        self.require("toggle_fragment", &[Phase::AwaitingAnswer])?;
        match self.question.as_mut() {
            Some(question @ Question::Combination { .. }) => Ok(question.toggle_fragment(index)),
            _ => Err(SessionError::InvalidAnswer),
        }
    }

    /// Submit the fragments selected so far.
    pub fn submit_selection(&mut self) -> Result<Option<Verdict>, SessionError> {
        let fragments = self
            .question
            .as_ref()
            .map(Question::selected_fragments)
            .unwrap_or_default();
        self.submit_answer(Answer::Fragments(fragments))
    }

    /// Pick a tile on the matching board. When the last pair is matched the
    /// stage is marked complete and the question revealed.
    pub fn select_tile(&mut self, side: Side, index: usize) -> Result<MatchOutcome, SessionError> {
        self.require("select_tile", &[Phase::AwaitingAnswer])?;
        let Some(Question::Matching(board)) = self.question.as_mut() else {
            return Err(SessionError::InvalidAnswer);
        };
        let outcome = board.select(side, index);
        if board.is_complete() {
            let prompt = self.question.as_ref().map(Question::prompt).unwrap_or_default();
            let record = AnswerRecord::completed(self.stage_ordinal(), &prompt);
            self.records.push(record);
            self.phase = Phase::Revealed;
            tracing::debug!("matching board complete");
        }
        Ok(outcome)
    }

    /// Show a walkthrough question through and record a completion marker.
    pub fn reveal(&mut self) -> Result<(), SessionError> {
        if self.phase == Phase::Revealed {
            return Ok(());
        }
        self.require("reveal", &[Phase::AwaitingAnswer])?;
        let question = self.question.as_ref().ok_or(SessionError::InvalidAnswer)?;
        if !question.is_walkthrough() {
            return Err(SessionError::InvalidAnswer);
        }
        let record = AnswerRecord::completed(self.stage_ordinal(), &question.prompt());
        self.records.push(record);
        self.phase = Phase::Revealed;
        Ok(())
    }

    /// Move to the next question, the first question of the next stage, or
    /// `Completed`. Returns the new phase.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        self.require("advance", &[Phase::Revealed])?;
        if !self.stage_complete() {
            self.index += 1;
            self.build_question()?;
            self.phase = Phase::Presenting;
            return Ok(self.phase);
        }

        let next = (self.stage + 1..self.stages.len()).find(|&i| !self.stages[i].is_empty());
        match next {
            Some(stage) => {
                tracing::debug!(stage = stage + 1, "entering stage");
                self.stage = stage;
                self.index = 0;
                self.build_question()?;
                self.phase = Phase::Presenting;
            }
            None => {
                self.question = None;
                self.completed_at = Some(Utc::now());
                self.phase = Phase::Completed;
                let score = summarize(&self.records);
                tracing::info!(
                    correct = score.correct,
                    total = score.total,
                    percentage = score.percentage,
                    "practice session completed"
                );
            }
        }
        Ok(self.phase)
    }

    // ---- observers ----

    pub fn current_question(&self) -> Option<&Question> {
        if self.phase.is_active() {
            self.question.as_ref()
        } else {
            None
        }
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        if self.phase.is_active() {
            self.stages.get(self.stage)
        } else {
            None
        }
    }

    /// Replay narration for the current question.
    pub fn replay(&self) -> Option<Cue> {
        self.current_question().and_then(Question::cue)
    }

    pub fn replay_phonics(&self) -> Option<Cue> {
        self.current_question().and_then(Question::phonics_cue)
    }

    pub fn replay_syllables(&self) -> Option<Cue> {
        self.current_question().and_then(Question::syllables_cue)
    }

    pub fn progress(&self) -> Progress {
        let total = self
            .stages
            .get(self.stage)
            .map(Stage::question_count)
            .unwrap_or(0);
        Progress {
            stage: self.stage + 1,
            stage_count: self.stages.len(),
            index: self.index,
            total,
            answered: self.records.len(),
        }
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    /// Score of the answers so far, without changing anything.
    pub fn preview(&self) -> Score {
        summarize(&self.records)
    }

    /// Final result, only once the session is `Completed`.
    pub fn result(&self) -> Option<SessionResult> {
        if self.phase != Phase::Completed {
            return None;
        }
        let flow = self.config.map(|c| c.kind)?;
        let completed_at = self.completed_at?;
        Some(SessionResult::new(flow, &self.records, completed_at))
    }

    // ---- internals ----

    fn prepare(
        &mut self,
        provider: &dyn ContentProvider,
        config: &FlowConfig,
        plan: &SessionPlan,
    ) -> Result<(), SessionError> {
        let (items, problems) = match config.source {
            PoolSource::Problems => {
                let difficulty = plan
                    .categories
                    .iter()
                    .find_map(|key| Difficulty::from_key(key))
                    .unwrap_or_default();
                let problems = generate_problems(difficulty, plan.size, &mut *self.rng);
                (Vec::new(), problems)
            }
            source => {
                let pool = resolve_pool(provider, source, &plan.categories);
                let mut working = pool.clone();
                match config.sampling {
                    Sampling::Sample => {
                        working.shuffle(&mut *self.rng);
                        working.truncate(plan.size);
                    }
                    Sampling::Shuffle => working.shuffle(&mut *self.rng),
                    Sampling::InOrder => {}
                }
                self.option_pool = pool;
                (working, Vec::new())
            }
        };

        self.stages = config
            .stages
            .iter()
            .map(|layout| {
                let (start, end) = layout.clip(items.len());
                Stage {
                    kind: layout.kind,
                    items: items[start..end].to_vec(),
                    problems: if layout.kind == StageKind::Arithmetic {
                        problems.clone()
                    } else {
                        Vec::new()
                    },
                }
            })
            .collect();

        self.stage = self
            .stages
            .iter()
            .position(|s| !s.is_empty())
            .ok_or(SessionError::EmptySelection)?;
        self.index = 0;
        self.build_question()
    }

    fn build_question(&mut self) -> Result<(), SessionError> {
        let Some(stage) = self.stages.get(self.stage) else {
            self.question = None;
            return Ok(());
        };
        self.question = Question::build(
            stage.kind,
            &stage.items,
            &stage.problems,
            self.index,
            &self.option_pool,
            &mut *self.rng,
        )?;
        Ok(())
    }

    /// Whether the current stage's completion rule holds.
    fn stage_complete(&self) -> bool {
        let Some(stage) = self.stages.get(self.stage) else {
            return true;
        };
        match stage.kind.completion() {
            Completion::EachItem => self.index + 1 >= stage.question_count(),
            Completion::AllPairsMatched => match &self.question {
                Some(Question::Matching(board)) => board.is_complete(),
                _ => true,
            },
        }
    }

    fn stage_ordinal(&self) -> u8 {
        u8::try_from(self.stage + 1).unwrap_or(u8::MAX)
    }

    fn discard(&mut self) {
        self.config = None;
        self.stages.clear();
        self.stage = 0;
        self.index = 0;
        self.question = None;
        self.records.clear();
        self.option_pool.clear();
        self.completed_at = None;
    }

    fn require(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            phase: self.phase,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Day of the 14-day read-along cycle for `date`.
pub fn read_along_day(date: NaiveDate) -> u32 {
    date.ordinal() % READ_ALONG_DAYS + 1
}

fn category_keys(provider: &dyn ContentProvider, subject: Subject) -> Vec<String> {
    provider
        .list_categories(subject)
        .iter()
        .map(|c| c.key.clone())
        .collect()
}

/// Candidate items for a flow, deduplicated by text in first-seen order.
fn resolve_pool(
    provider: &dyn ContentProvider,
    source: PoolSource,
    categories: &[String],
) -> Vec<Item> {
    let candidates: Vec<Item> = match source {
        PoolSource::Subject(subject) => provider.all_items(subject),
        PoolSource::Categories | PoolSource::MaskableCategories => {
            let mut keys: Vec<&str> = Vec::new();
            for key in categories {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
            keys.iter()
                .flat_map(|key| provider.items_for(key).iter().cloned())
                .collect()
        }
        PoolSource::Problems => Vec::new(),
    };

    let mut pool: Vec<Item> = Vec::with_capacity(candidates.len());
    for item in candidates {
        if source == PoolSource::MaskableCategories && !has_maskable_position(&item.text) {
            continue;
        }
        if !pool.iter().any(|p| p.text == item.text) {
            pool.push(item);
        }
    }
    pool
}
