use std::time::Instant;

use chrono::Local;

use crate::config::Config;
use crate::content::{ContentProvider, Dataset};
use crate::error::{NarrationError, SessionError};
use crate::narration::{Cue, NarrationBackend, Narrator};
use crate::session::practice::{DEFAULT_SESSION_SIZE, read_along_day};
use crate::session::{
    Answer, FlowKind, MatchOutcome, Phase, Question, Session, SessionPlan, Side,
};
use crate::ui::command::{self, Command};
use crate::ui::render;

/// Front end over a [`Session`]: turns typed lines into session operations.
/// Every operation returns its feedback lines; [`App::screen`] renders the
/// current state.
pub struct App {
    pub session: Session,
    pub narrator: Narrator,
    pub dataset: Dataset,
    pub config: Config,
    /// Line being typed.
    pub input: String,
    /// Feedback for the last action, shown under the screen.
    pub messages: Vec<String>,
    pub should_quit: bool,
    narration_notice_shown: bool,
}

impl App {
    pub fn new(
        dataset: Dataset,
        config: Config,
        session: Session,
        backend: Box<dyn NarrationBackend>,
    ) -> Self {
        let narrator = Narrator::new(backend, config.speech.clone());
        Self {
            session,
            narrator,
            dataset,
            config,
            input: String::new(),
            messages: Vec::new(),
            should_quit: false,
            narration_notice_shown: false,
        }
    }

    /// Working-set size for sampled flows.
    pub fn session_size(&self) -> usize {
        if self.config.session_size == 0 {
            DEFAULT_SESSION_SIZE
        } else {
            self.config.session_size
        }
    }

    /// Start `plan` right away, or fall back to category selection.
    pub fn start(&mut self, plan: SessionPlan, now: Instant) -> Vec<String> {
        let flow = plan.flow;
        match self.session.start(&self.dataset, plan) {
            Ok(()) => self.present(now),
            Err(err) => {
                if flow.subject().is_none() {
                    self.should_quit = true;
                }
                self.report(&err)
            }
        }
    }

    /// Open the category list for `flow`.
    pub fn choose_categories(&mut self, flow: FlowKind) -> Vec<String> {
        match self.session.begin_selection(flow) {
            Ok(()) => Vec::new(),
            Err(err) => self.report(&err),
        }
    }

    pub fn type_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Run the typed line and keep its feedback.
    pub fn submit_input(&mut self, now: Instant) {
        let line = std::mem::take(&mut self.input);
        self.messages = self.handle_line(&line, now);
    }

    /// Open `flow` the way the menu does: category lists for the phonics
    /// flows, today's sentences for read-along, configured problems for
    /// arithmetic.
    pub fn open_flow(&mut self, flow: FlowKind, now: Instant) -> Vec<String> {
        match flow {
            FlowKind::Dictation | FlowKind::FillBlank => self.choose_categories(flow),
            FlowKind::LongWord | FlowKind::Irregular => {
                let plan = SessionPlan::new(flow, &[], self.session_size());
                self.start(plan, now)
            }
            FlowKind::ReadAlong => {
                let day = read_along_day(Local::now().date_naive());
                self.start(SessionPlan::read_along(day), now)
            }
            FlowKind::Arithmetic => {
                let plan =
                    SessionPlan::arithmetic(self.config.difficulty(), self.config.question_count);
                self.start(plan, now)
            }
        }
    }

    /// What the quiz area shows for the current phase.
    pub fn screen(&self) -> Vec<String> {
        match self.session.phase() {
            Phase::Idle => {
                let mut lines = render::flows();
                lines.push(String::new());
                lines.push(render::menu_help());
                lines
            }
            Phase::Selecting => {
                let Some(subject) = self.session.flow().and_then(FlowKind::subject) else {
                    return Vec::new();
                };
                let mut lines =
                    render::categories(&self.dataset, subject, self.session.selection());
                lines.push(String::new());
                lines.push(render::selection_help());
                lines
            }
            Phase::Completed => self
                .session
                .result()
                .map(|result| render::result(&result))
                .unwrap_or_default(),
            Phase::Presenting | Phase::AwaitingAnswer | Phase::Revealed => {
                let progress = self.session.progress();
                self.current_lines(|q| render::question(q, &progress))
            }
        }
    }

    pub fn handle_line(&mut self, line: &str, now: Instant) -> Vec<String> {
        let kind = self.session.current_question().map(Question::kind);
        let command = command::parse(line, kind);
        tracing::debug!(?command, phase = ?self.session.phase(), "input");

        match command {
            Command::Quit => {
                self.narrator.stop();
                self.should_quit = true;
                Vec::new()
            }
            Command::Replay => {
                let cue = self.session.replay();
                self.replay(cue, now)
            }
            Command::Phonics => {
                let cue = self.session.replay_phonics();
                self.replay(cue, now)
            }
            Command::Syllables => {
                let cue = self.session.replay_syllables();
                self.replay(cue, now)
            }
            Command::Restart => match self.session.restart(&self.dataset) {
                Ok(()) => self.present(now),
                Err(err) => self.report(&err),
            },
            Command::Menu => {
                self.narrator.stop();
                self.session.go_to_menu();
                Vec::new()
            }
            Command::Categories => {
                self.narrator.stop();
                match self.session.plan().map(|plan| plan.flow) {
                    Some(flow) if flow.subject().is_some() => self.session.reset(),
                    Some(_) => self.session.go_to_menu(),
                    None => {}
                }
                Vec::new()
            }
            Command::OtherDay => {
                if self.session.flow() != Some(FlowKind::ReadAlong) {
                    return Vec::new();
                }
                match self.session.restart_with_other_day(&self.dataset) {
                    Ok(()) => self.present(now),
                    Err(err) => self.report(&err),
                }
            }
            command => match self.session.phase() {
                Phase::Selecting => self.handle_selection(command, now),
                Phase::AwaitingAnswer => self.handle_answer(command),
                Phase::Revealed => self.handle_revealed(command, now),
                Phase::Idle => self.handle_menu(command, now),
                Phase::Completed | Phase::Presenting => Vec::new(),
            },
        }
    }

    /// Release due narration.
    pub fn tick(&mut self, now: Instant) -> Vec<String> {
        match self.narrator.tick(now) {
            Ok(_) => Vec::new(),
            Err(err) => self.narration_failed(&err),
        }
    }

    pub fn play(&mut self, cue: &Cue, now: Instant) -> Vec<String> {
        match self.narrator.play(cue, now) {
            Ok(()) => Vec::new(),
            Err(err) => self.narration_failed(&err),
        }
    }

    fn handle_menu(&mut self, command: Command, now: Instant) -> Vec<String> {
        let flow = match command {
            Command::Pick(index) => FlowKind::all().get(index).copied(),
            Command::Text(key) => FlowKind::from_key(&key.to_lowercase().replace('-', "_")),
            _ => return Vec::new(),
        };
        match flow {
            Some(flow) => self.open_flow(flow, now),
            None => vec!["No flow like that. Pick one from the list.".to_string()],
        }
    }

    fn handle_selection(&mut self, command: Command, now: Instant) -> Vec<String> {
        match command {
            Command::Continue => {
                let size = self.session_size();
                match self.session.start_selected(&self.dataset, size) {
                    Ok(()) => self.present(now),
                    Err(err) => self.report(&err),
                }
            }
            Command::SelectAll => match self.session.select_all(&self.dataset) {
                Ok(()) => Vec::new(),
                Err(err) => self.report(&err),
            },
            Command::Pick(index) => {
                let key = self.category_key(index);
                self.toggle(key.as_deref())
            }
            Command::Text(text) => {
                for key in text.split_whitespace() {
                    if self.dataset.category(key).is_none() {
                        return vec![format!("There is no category called {key:?}.")];
                    }
                    if let Err(err) = self.session.toggle_category(key) {
                        return self.report(&err);
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_answer(&mut self, command: Command) -> Vec<String> {
        let is_combination = matches!(
            self.session.current_question(),
            Some(Question::Combination { .. })
        );
        match command {
            Command::Pick(index) if is_combination => match self.session.toggle_fragment(index) {
                Ok(true) => Vec::new(),
                Ok(false) => vec!["No piece with that number.".to_string()],
                Err(err) => self.report(&err),
            },
            Command::Pick(index) => self.submit(Answer::Choice(index)),
            Command::Text(text) => self.submit(Answer::Text(text)),
            Command::Check => match self.session.submit_selection() {
                Ok(Some(verdict)) => self.current_lines(|q| render::verdict(&verdict, q)),
                Ok(None) => Vec::new(),
                Err(err) => self.report(&err),
            },
            Command::Tile(side, index) => self.select_tile(side, index),
            Command::Pair(left, right) => match self.session.select_tile(Side::Left, left) {
                // an ignored left tile leaves the right one unselected
                Ok(MatchOutcome::Selected) => self.select_tile(Side::Right, right),
                Ok(outcome) => self.match_lines(outcome),
                Err(err) => self.report(&err),
            },
            Command::Continue => {
                let walkthrough = self
                    .session
                    .current_question()
                    .is_some_and(Question::is_walkthrough);
                if !walkthrough {
                    return vec!["Answer first, or :s to hear it again.".to_string()];
                }
                match self.session.reveal() {
                    Ok(()) => self.current_lines(render::revealed),
                    Err(err) => self.report(&err),
                }
            }
            _ => Vec::new(),
        }
    }

    fn handle_revealed(&mut self, command: Command, now: Instant) -> Vec<String> {
        if command != Command::Continue {
            return Vec::new();
        }
        match self.session.advance() {
            Ok(Phase::Completed) => {
                self.narrator.stop();
                Vec::new()
            }
            Ok(_) => self.present(now),
            Err(err) => self.report(&err),
        }
    }

    fn submit(&mut self, answer: Answer) -> Vec<String> {
        match self.session.submit_answer(answer) {
            Ok(Some(verdict)) => self.current_lines(|q| render::verdict(&verdict, q)),
            Ok(None) => Vec::new(),
            Err(err) => self.report(&err),
        }
    }

    fn select_tile(&mut self, side: Side, index: usize) -> Vec<String> {
        match self.session.select_tile(side, index) {
            Ok(outcome) => self.match_lines(outcome),
            Err(err) => self.report(&err),
        }
    }

    fn match_lines(&self, outcome: MatchOutcome) -> Vec<String> {
        self.current_lines(|q| match q {
            Question::Matching(board) => render::match_outcome(outcome, board),
            _ => Vec::new(),
        })
    }

    /// Show the pending question and play its narration.
    fn present(&mut self, now: Instant) -> Vec<String> {
        match self.session.present() {
            Ok(Some(cue)) => self.play(&cue, now),
            Ok(None) => Vec::new(),
            Err(err) => self.report(&err),
        }
    }

    fn replay(&mut self, cue: Option<Cue>, now: Instant) -> Vec<String> {
        match cue {
            Some(cue) => self.play(&cue, now),
            None => Vec::new(),
        }
    }

    fn current_lines(&self, f: impl FnOnce(&Question) -> Vec<String>) -> Vec<String> {
        self.session.current_question().map(f).unwrap_or_default()
    }

    fn category_key(&self, index: usize) -> Option<String> {
        let subject = self.session.flow().and_then(FlowKind::subject)?;
        self.dataset
            .list_categories(subject)
            .get(index)
            .map(|c| c.key.clone())
    }

    fn toggle(&mut self, key: Option<&str>) -> Vec<String> {
        let Some(key) = key else {
            return vec!["No category with that number.".to_string()];
        };
        match self.session.toggle_category(key) {
            Ok(_) => Vec::new(),
            Err(err) => self.report(&err),
        }
    }

    fn report(&self, err: &SessionError) -> Vec<String> {
        match err {
            SessionError::InvalidTransition { .. } => {
                tracing::debug!(error = %err, "ignored input");
                Vec::new()
            }
            SessionError::InvalidAnswer => vec!["That doesn't fit this question, try again.".to_string()],
            SessionError::EmptySelection => {
                vec!["Nothing to practice in that choice. Pick some categories.".to_string()]
            }
            other => {
                tracing::warn!(error = %other, "session error");
                vec![format!("Something went wrong: {other}")]
            }
        }
    }

    fn narration_failed(&mut self, err: &NarrationError) -> Vec<String> {
        if self.narration_notice_shown {
            return Vec::new();
        }
        self.narration_notice_shown = true;
        vec![format!("Note: {err}; continuing without sound.")]
    }
}
