use std::collections::HashSet;
use std::time::{Duration, Instant};

use learnpark::config::Config;
use learnpark::content::{Category, ContentProvider, Dataset, Item, Subject};
use learnpark::engine::scoring::Tier;
use learnpark::error::SessionError;
use learnpark::generator::arithmetic::{Difficulty, Operator};
use learnpark::narration::{
    BackendEvent, MemoryBackend, NarrationSequencer, SequenceOptions, SpeakOptions,
};
use learnpark::session::{Answer, FlowKind, Phase, Question, Session, SessionPlan, Side};

fn category(key: &str, subject: Subject) -> Category {
    Category {
        key: key.to_string(),
        name: key.to_string(),
        example: String::new(),
        subject,
    }
}

fn word_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| Item::new(&format!("word{i:02}"), &format!("meaning {i}")))
        .collect()
}

/// Give the right answer to whatever question is showing.
fn answer_correctly(session: &mut Session) {
    let question = session.current_question().cloned().expect("active question");
    match question {
        Question::Choice { item, options } => {
            let index = options.iter().position(|o| o.text == item.text).unwrap();
            session.submit_answer(Answer::Choice(index)).unwrap();
        }
        Question::Blank { blank, .. } => {
            let index = blank.options.iter().position(|&c| c == blank.correct).unwrap();
            session.submit_answer(Answer::Choice(index)).unwrap();
        }
        Question::SentenceFill { item, fill } => {
            let index = fill.options.iter().position(|o| *o == item.text).unwrap();
            session.submit_answer(Answer::Choice(index)).unwrap();
        }
        Question::Puzzle { item, .. } => {
            session.submit_answer(Answer::Text(item.text.to_uppercase())).unwrap();
        }
        Question::Arithmetic(problem) => {
            session
                .submit_answer(Answer::Text(format!(" {} ", problem.answer)))
                .unwrap();
        }
        Question::Combination { item, fragments, .. } => {
            let mut used = Vec::new();
            for unit in item.units() {
                let index = (0..fragments.len())
                    .find(|i| fragments[*i] == unit && !used.contains(i))
                    .unwrap();
                used.push(index);
                session.toggle_fragment(index).unwrap();
            }
            session.submit_selection().unwrap();
        }
        Question::Matching(board) => {
            for pair in 0..board.pair_count() {
                let left = board.position_of(Side::Left, pair).unwrap();
                let right = board.position_of(Side::Right, pair).unwrap();
                session.select_tile(Side::Left, left).unwrap();
                session.select_tile(Side::Right, right).unwrap();
            }
        }
        Question::Teaching { .. } | Question::Decoding { .. } | Question::ReadAlong { .. } => {
            session.reveal().unwrap();
        }
    }
}

/// Drive a started session to completion, answering everything correctly.
/// Returns how many times `advance` was called.
fn run_to_completion(session: &mut Session) -> usize {
    let mut advances = 0;
    while session.phase() != Phase::Completed {
        session.present().unwrap();
        answer_correctly(session);
        assert_eq!(session.phase(), Phase::Revealed);
        session.advance().unwrap();
        advances += 1;
        assert!(advances < 500, "session never completed");
    }
    advances
}

#[test]
fn dictation_nine_of_ten_is_excellent() {
    let mut dataset = Dataset::default();
    dataset.insert(category("letters", Subject::Phonics), word_items(12));
    let mut session = Session::seeded(2024);
    session
        .start(&dataset, SessionPlan::new(FlowKind::Dictation, &["letters"], 10))
        .unwrap();

    for n in 0..10 {
        session.present().unwrap();
        let Some(Question::Choice { item, options }) = session.current_question().cloned() else {
            panic!("dictation shows choice questions");
        };
        assert_eq!(options.len(), 4);
        let index = if n == 4 {
            options.iter().position(|o| o.text != item.text).unwrap()
        } else {
            options.iter().position(|o| o.text == item.text).unwrap()
        };
        let verdict = session.submit_answer(Answer::Choice(index)).unwrap().unwrap();
        assert_eq!(verdict.correct, n != 4);
        let phase = session.advance().unwrap();
        assert_eq!(phase == Phase::Completed, n == 9);
    }

    let result = session.result().unwrap();
    assert_eq!(result.score.correct, 9);
    assert_eq!(result.score.total, 10);
    assert_eq!(result.score.percentage, 90);
    assert_eq!(result.score.tier, Tier::Excellent);
    assert_eq!(result.mistakes().count(), 1);
}

#[test]
fn easy_arithmetic_stays_within_bounds() {
    let dataset = Dataset::default();
    for seed in 0..20 {
        let mut session = Session::seeded(seed);
        session
            .start(&dataset, SessionPlan::arithmetic(Difficulty::Easy, 10))
            .unwrap();
        let problems = session.current_stage().unwrap().problems.clone();
        assert_eq!(problems.len(), 10);
        for p in problems {
            assert!((1..=20).contains(&p.a) && (1..=20).contains(&p.b), "{p:?}");
            match p.operator {
                Operator::Add => assert_eq!(p.answer, p.a + p.b),
                Operator::Sub => {
                    assert!(p.a >= p.b);
                    assert_eq!(p.answer, p.a - p.b);
                }
            }
        }
        assert_eq!(run_to_completion(&mut session), 10);
        assert_eq!(session.result().unwrap().score.percentage, 100);
    }
}

#[test]
fn long_word_session_walks_three_stages() {
    let mut dataset = Dataset::default();
    let items: Vec<Item> = (0..13)
        .map(|i| {
            let (a, b) = (format!("pa{i}"), format!("qo{i}"));
            Item::new(&format!("{a}{b}"), "").with_hint(&format!("{a}-{b}"))
        })
        .collect();
    dataset.insert(category("long_words", Subject::LongWords), items);

    let mut session = Session::seeded(13);
    session
        .start(&dataset, SessionPlan::new(FlowKind::LongWord, &[], 10))
        .unwrap();

    let mut stage_sizes = Vec::new();
    for step in 1..=13 {
        session.present().unwrap();
        let progress = session.progress();
        if progress.index == 0 {
            stage_sizes.push(progress.total);
        }
        answer_correctly(&mut session);
        let phase = session.advance().unwrap();
        assert_eq!(phase == Phase::Completed, step == 13, "step {step}");
    }
    assert_eq!(stage_sizes, vec![3, 5, 5]);
    assert_eq!(session.records().len(), 13);

    let score = session.result().unwrap().score;
    assert_eq!(score.completed, 8);
    assert_eq!((score.correct, score.total), (5, 5));
    assert_eq!(score.stages.len(), 3);
}

#[test]
fn matching_stage_refuses_advance_until_all_pairs_match() {
    let mut dataset = Dataset::default();
    dataset.insert(category("irregular", Subject::IrregularWords), word_items(5));
    let mut session = Session::seeded(5);
    session
        .start(&dataset, SessionPlan::new(FlowKind::Irregular, &[], 10))
        .unwrap();
    session.present().unwrap();

    for pair in 0..5 {
        let before = session.records().len();
        let err = session.advance().unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert_eq!(session.phase(), Phase::AwaitingAnswer);
        assert_eq!(session.records().len(), before);

        let Some(Question::Matching(board)) = session.current_question() else {
            panic!("irregular words open with the matching board");
        };
        assert_eq!(board.matched_count(), pair);
        let left = board.position_of(Side::Left, pair).unwrap();
        let right = board.position_of(Side::Right, pair).unwrap();
        session.select_tile(Side::Left, left).unwrap();
        session.select_tile(Side::Right, right).unwrap();
    }

    assert_eq!(session.phase(), Phase::Revealed);
    assert_eq!(session.advance().unwrap(), Phase::Completed);
    assert!(session.advance().is_err());
}

#[test]
fn mismatched_tiles_do_not_complete_the_board() {
    let mut dataset = Dataset::default();
    dataset.insert(category("irregular", Subject::IrregularWords), word_items(3));
    let mut session = Session::seeded(6);
    session
        .start(&dataset, SessionPlan::new(FlowKind::Irregular, &[], 10))
        .unwrap();
    session.present().unwrap();

    let Some(Question::Matching(board)) = session.current_question() else {
        panic!("expected matching board");
    };
    let left = board.position_of(Side::Left, 0).unwrap();
    let wrong = board.position_of(Side::Right, 1).unwrap();
    session.select_tile(Side::Left, left).unwrap();
    session.select_tile(Side::Right, wrong).unwrap();
    assert_eq!(session.phase(), Phase::AwaitingAnswer);
    assert!(session.records().is_empty());
}

#[test]
fn working_sets_are_unique_samples_of_the_pool() {
    let mut dataset = Dataset::default();
    dataset.insert(category("letters", Subject::Phonics), word_items(12));
    let pool: HashSet<String> = dataset.items_for("letters").iter().map(|i| i.text.clone()).collect();

    for (seed, size) in (0..30).zip([1, 4, 7, 10, 12].into_iter().cycle()) {
        let mut session = Session::seeded(seed);
        session
            .start(&dataset, SessionPlan::new(FlowKind::Dictation, &["letters"], size))
            .unwrap();
        let items = &session.current_stage().unwrap().items;
        let texts: HashSet<&String> = items.iter().map(|i| &i.text).collect();
        assert_eq!(items.len(), size);
        assert_eq!(texts.len(), size);
        assert!(texts.iter().all(|t| pool.contains(*t)));
    }
}

#[test]
fn second_speak_cancels_the_first() {
    let backend = MemoryBackend::new();
    let mut sequencer = NarrationSequencer::new(Box::new(backend.clone()));
    let options = SpeakOptions::from_profile(&Config::default().speech.english);
    let now = Instant::now();

    sequencer.speak("first", &options, now).unwrap();
    sequencer.speak("second", &options, now).unwrap();

    let order: Vec<String> = backend
        .events()
        .iter()
        .map(|event| match event {
            BackendEvent::Speak(u) => u.text.clone(),
            BackendEvent::Cancel => "<cancel>".to_string(),
        })
        .collect();
    assert_eq!(order, vec!["<cancel>", "first", "<cancel>", "second"]);
    assert_eq!(sequencer.pending(), 0);
}

#[test]
fn new_request_drops_the_rest_of_a_sequence() {
    let backend = MemoryBackend::new();
    let mut sequencer = NarrationSequencer::new(Box::new(backend.clone()));
    let speech = Config::default().speech;
    let english = SpeakOptions::from_profile(&speech.english);
    let sequence = SequenceOptions::new(english.clone(), speech.syllables, speech.word_rate);
    let now = Instant::now();

    let units: Vec<String> = ["ad", "ven", "ture"].map(String::from).to_vec();
    sequencer
        .speak_sequentially(&units, "adventure", &sequence, now)
        .unwrap();
    assert_eq!(backend.spoken(), vec!["ad"]);
    assert_eq!(sequencer.pending(), 3);

    sequencer.speak("cat", &english, now).unwrap();
    sequencer.tick(now + Duration::from_secs(10)).unwrap();
    assert_eq!(backend.spoken(), vec!["ad", "cat"]);
}

#[test]
fn every_flow_runs_on_the_embedded_content() {
    let dataset = Dataset::load().unwrap();
    let phonics: Vec<String> = dataset
        .list_categories(Subject::Phonics)
        .iter()
        .map(|c| c.key.clone())
        .collect();
    let phonics: Vec<&str> = phonics.iter().map(String::as_str).collect();

    let plans = [
        SessionPlan::new(FlowKind::Dictation, &phonics, 10),
        SessionPlan::new(FlowKind::FillBlank, &phonics, 10),
        SessionPlan::new(FlowKind::LongWord, &[], 10),
        SessionPlan::new(FlowKind::Irregular, &[], 10),
        SessionPlan::read_along(3),
        SessionPlan::arithmetic(Difficulty::Hard, 30),
    ];
    for (seed, plan) in plans.into_iter().enumerate() {
        let flow = plan.flow;
        let mut session = Session::seeded(seed as u64);
        session.start(&dataset, plan).unwrap();
        run_to_completion(&mut session);
        let result = session.result().unwrap();
        assert_eq!(result.flow, flow);
        assert_eq!(result.score.percentage, 100, "{flow:?}");
        assert_eq!(result.mistakes().count(), 0);
    }
}

#[test]
fn practice_again_resamples_after_completion() {
    let dataset = Dataset::load().unwrap();
    let mut session = Session::seeded(77);
    session
        .start(&dataset, SessionPlan::new(FlowKind::Irregular, &[], 10))
        .unwrap();
    run_to_completion(&mut session);
    session.restart(&dataset).unwrap();
    assert_eq!(session.phase(), Phase::Presenting);
    assert!(session.records().is_empty());
    assert_eq!(session.progress().stage, 1);
}
