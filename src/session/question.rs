use rand::Rng;

use crate::content::Item;
use crate::error::{GeneratorError, SessionError};
use crate::generator::arithmetic::Problem;
use crate::generator::blank::{Blank, generate_blank};
use crate::generator::distractor::generate_options;
use crate::generator::modules::generate_module_pool;
use crate::generator::scramble::scramble;
use crate::generator::sentence::{SentenceFill, generate_sentence_fill};
use crate::narration::Cue;
use crate::session::answer::{Answer, normalize_text};
use crate::session::flow::{StageKind, Validator};
use crate::session::matching::{MatchingBoard, Side};

/// Presentation data for the active item, regenerated whenever the item changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Question {
    /// Hear the word, pick it among the options.
    Choice { item: Item, options: Vec<Item> },
    Blank { item: Item, blank: Blank },
    Teaching { item: Item },
    Decoding { item: Item },
    /// Build the word by toggling fragments; `selected` keeps click order.
    Combination {
        item: Item,
        fragments: Vec<String>,
        selected: Vec<usize>,
    },
    Matching(MatchingBoard),
    SentenceFill { item: Item, fill: SentenceFill },
    Puzzle { item: Item, scrambled: String },
    ReadAlong { item: Item },
    Arithmetic(Problem),
}

/// Result of checking an answer: what was submitted, in display form, and
/// whether it was right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub submitted: String,
    pub correct: bool,
}

impl Question {
    /// Build the question for position `index` of a stage.
    ///
    /// `items`/`problems` are the stage's working set; `option_pool` is where
    /// choice distractors and sentence-fill alternatives come from.
    pub fn build<R: Rng + ?Sized>(
        kind: StageKind,
        items: &[Item],
        problems: &[Problem],
        index: usize,
        option_pool: &[Item],
        rng: &mut R,
    ) -> Result<Option<Self>, GeneratorError> {
        if kind == StageKind::Arithmetic {
            return Ok(problems.get(index).copied().map(Question::Arithmetic));
        }
        if kind == StageKind::Matching {
            if index > 0 || items.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Question::Matching(MatchingBoard::new(items, rng))));
        }
        let Some(item) = items.get(index).cloned() else {
            return Ok(None);
        };

        let question = match kind {
            StageKind::Choice => {
                let options = generate_options(&item, option_pool, rng);
                Question::Choice { item, options }
            }
            StageKind::Blank => {
                let blank = generate_blank(&item.text, rng)?;
                Question::Blank { item, blank }
            }
            StageKind::Teaching => Question::Teaching { item },
            StageKind::Decoding => Question::Decoding { item },
            StageKind::Combination => {
                let fragments = generate_module_pool(&item, items, rng);
                Question::Combination {
                    item,
                    fragments,
                    selected: Vec::new(),
                }
            }
            StageKind::SentenceFill => {
                let fill = generate_sentence_fill(&item, option_pool, rng);
                Question::SentenceFill { item, fill }
            }
            StageKind::Puzzle => {
                let scrambled = scramble(&item.text, rng);
                Question::Puzzle { item, scrambled }
            }
            StageKind::ReadAlong => Question::ReadAlong { item },
            StageKind::Matching | StageKind::Arithmetic => return Ok(None),
        };
        Ok(Some(question))
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Question::Choice { .. } => StageKind::Choice,
            Question::Blank { .. } => StageKind::Blank,
            Question::Teaching { .. } => StageKind::Teaching,
            Question::Decoding { .. } => StageKind::Decoding,
            Question::Combination { .. } => StageKind::Combination,
            Question::Matching(_) => StageKind::Matching,
            Question::SentenceFill { .. } => StageKind::SentenceFill,
            Question::Puzzle { .. } => StageKind::Puzzle,
            Question::ReadAlong { .. } => StageKind::ReadAlong,
            Question::Arithmetic(_) => StageKind::Arithmetic,
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            Question::Choice { item, .. }
            | Question::Blank { item, .. }
            | Question::Teaching { item }
            | Question::Decoding { item }
            | Question::Combination { item, .. }
            | Question::SentenceFill { item, .. }
            | Question::Puzzle { item, .. }
            | Question::ReadAlong { item } => Some(item),
            Question::Matching(_) | Question::Arithmetic(_) => None,
        }
    }

    /// What the answer log records as the question.
    pub fn prompt(&self) -> String {
        match self {
            Question::SentenceFill { fill, .. } => fill.masked.clone(),
            Question::Puzzle { item, scrambled } => {
                if item.meaning.is_empty() {
                    scrambled.clone()
                } else {
                    item.meaning.clone()
                }
            }
            Question::Arithmetic(problem) => problem.to_string(),
            Question::Matching(board) => board
                .tiles(Side::Left)
                .iter()
                .map(|t| t.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            _ => self.item().map(|i| i.text.clone()).unwrap_or_default(),
        }
    }

    /// Correct answer in display form.
    pub fn expected(&self) -> String {
        match self {
            Question::Blank { blank, .. } => blank.correct.to_string(),
            Question::Combination { item, .. } => item.units().join("-"),
            Question::Arithmetic(problem) => problem.answer.to_string(),
            _ => self.item().map(|i| i.text.clone()).unwrap_or_default(),
        }
    }

    /// Labels of the choosable options, for option-based questions.
    pub fn options(&self) -> Vec<String> {
        match self {
            Question::Choice { options, .. } => options.iter().map(|o| o.text.clone()).collect(),
            Question::Blank { blank, .. } => blank.options.iter().map(|c| c.to_string()).collect(),
            Question::SentenceFill { fill, .. } => fill.options.clone(),
            _ => Vec::new(),
        }
    }

    pub fn is_walkthrough(&self) -> bool {
        self.kind().is_walkthrough()
    }

    /// Check `answer` against this question. `InvalidAnswer` when the answer
    /// has the wrong shape or points at an option that does not exist.
    pub fn check(&self, answer: &Answer) -> Result<Verdict, SessionError> {
        let verdict = match (self.kind().validator(), answer) {
            (Validator::OptionIdentity, Answer::Choice(i)) => {
                let submitted = self
                    .options()
                    .get(*i)
                    .cloned()
                    .ok_or(SessionError::InvalidAnswer)?;
                let correct = submitted == self.expected();
                Verdict { submitted, correct }
            }
            (Validator::CaseInsensitiveText, Answer::Text(text)) => Verdict {
                submitted: text.clone(),
                correct: normalize_text(text) == normalize_text(&self.expected()),
            },
            (Validator::Integer, Answer::Text(text)) => {
                let Question::Arithmetic(problem) = self else {
                    return Err(SessionError::InvalidAnswer);
                };
                Verdict {
                    submitted: text.trim().to_string(),
                    correct: problem.check(text),
                }
            }
            (Validator::Fragments, Answer::Fragments(fragments)) => {
                let word = self.item().map(|i| i.text.to_lowercase()).unwrap_or_default();
                Verdict {
                    submitted: fragments.join("-"),
                    correct: fragments.concat().to_lowercase() == word,
                }
            }
            // walkthroughs are revealed, boards are played tile by tile
            _ => return Err(SessionError::InvalidAnswer),
        };
        Ok(verdict)
    }

    /// Add or remove fragment `index` from the combination selection.
    pub fn toggle_fragment(&mut self, index: usize) -> bool {
        let Question::Combination {
            fragments, selected, ..
        } = self
        else {
            return false;
        };
        if index >= fragments.len() {
            return false;
        }
        match selected.iter().position(|&s| s == index) {
            Some(pos) => {
                selected.remove(pos);
            }
            None => selected.push(index),
        }
        true
    }

    /// Selected fragments in click order.
    pub fn selected_fragments(&self) -> Vec<String> {
        match self {
            Question::Combination {
                fragments, selected, ..
            } => selected
                .iter()
                .filter_map(|&i| fragments.get(i).cloned())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Narration played when the question is presented.
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Question::Choice { item, .. } | Question::Blank { item, .. } => {
                Some(Cue::Word(item.text.clone()))
            }
            Question::Teaching { item } => self.syllables_cue().or(Some(Cue::Word(item.text.clone()))),
            Question::ReadAlong { item } => Some(Cue::Sentence(item.text.clone())),
            Question::Arithmetic(problem) => Some(Cue::Word(problem.spoken())),
            _ => None,
        }
    }

    /// Phonics breakdown followed by the word, when the item has one.
    pub fn phonics_cue(&self) -> Option<Cue> {
        let item = self.item()?;
        item.hint.as_ref()?;
        Some(Cue::Phonics {
            units: item.units().iter().map(|u| u.to_string()).collect(),
            word: item.text.clone(),
        })
    }

    /// Syllables followed by the word, when the item has them.
    pub fn syllables_cue(&self) -> Option<Cue> {
        let item = self.item()?;
        item.hint.as_ref()?;
        Some(Cue::Syllables {
            units: item.units().iter().map(|u| u.to_string()).collect(),
            word: item.text.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::generator::arithmetic::Operator;

    fn words() -> Vec<Item> {
        ["cat", "hat", "map", "bag", "fan"]
            .iter()
            .map(|w| Item::new(w, ""))
            .collect()
    }

    fn build(kind: StageKind, items: &[Item]) -> Question {
        let mut rng = SmallRng::seed_from_u64(42);
        Question::build(kind, items, &[], 0, items, &mut rng)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_choice_checks_option_identity() {
        let question = build(StageKind::Choice, &words());
        let options = question.options();
        let right = options.iter().position(|o| o == "cat").unwrap();
        let wrong = (right + 1) % options.len();
        assert!(question.check(&Answer::Choice(right)).unwrap().correct);
        let verdict = question.check(&Answer::Choice(wrong)).unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.submitted, options[wrong]);
        assert_eq!(question.check(&Answer::Choice(9)), Err(SessionError::InvalidAnswer));
        assert_eq!(
            question.check(&Answer::Text("cat".into())),
            Err(SessionError::InvalidAnswer)
        );
    }

    #[test]
    fn test_blank_checks_letter() {
        let question = build(StageKind::Blank, &words());
        let Question::Blank { blank, .. } = &question else {
            panic!("expected a blank question");
        };
        let right = blank.options.iter().position(|&c| c == 'a').unwrap();
        assert!(question.check(&Answer::Choice(right)).unwrap().correct);
        assert_eq!(question.expected(), "a");
    }

    #[test]
    fn test_blank_fails_on_vowelless_item() {
        let items = vec![Item::new("rhythm", "")];
        let mut rng = SmallRng::seed_from_u64(1);
        let err = Question::build(StageKind::Blank, &items, &[], 0, &items, &mut rng).unwrap_err();
        assert_eq!(err, GeneratorError::NoMaskablePosition("rhythm".into()));
    }

    #[test]
    fn test_puzzle_is_case_insensitive_and_trimmed() {
        let items = vec![Item::new("because", "因为")];
        let question = build(StageKind::Puzzle, &items);
        assert!(question.check(&Answer::Text("  BeCause ".into())).unwrap().correct);
        assert!(!question.check(&Answer::Text("becuase".into())).unwrap().correct);
        assert_eq!(question.prompt(), "因为");
    }

    #[test]
    fn test_combination_joins_selected_fragments() {
        let items = vec![
            Item::new("Rainbow", "").with_hint("rain-bow"),
            Item::new("sandwich", "").with_hint("sand-wich"),
        ];
        let mut question = build(StageKind::Combination, &items);
        let Question::Combination { fragments, .. } = &question else {
            panic!("expected a combination question");
        };
        let rain = fragments.iter().position(|f| f == "rain").unwrap();
        let bow = fragments.iter().position(|f| f == "bow").unwrap();

        assert!(question.toggle_fragment(rain));
        assert!(question.toggle_fragment(bow));
        assert_eq!(question.selected_fragments(), vec!["rain", "bow"]);
        let verdict = question
            .check(&Answer::Fragments(question.selected_fragments()))
            .unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.submitted, "rain-bow");
        assert_eq!(question.expected(), "rain-bow");

        // toggling again removes
        assert!(question.toggle_fragment(rain));
        assert_eq!(question.selected_fragments(), vec!["bow"]);
        assert!(!question.toggle_fragment(99));
    }

    #[test]
    fn test_combination_order_matters() {
        let items = vec![Item::new("rainbow", "").with_hint("rain-bow")];
        let question = build(StageKind::Combination, &items);
        let verdict = question
            .check(&Answer::Fragments(vec!["bow".into(), "rain".into()]))
            .unwrap();
        assert!(!verdict.correct);
    }

    #[test]
    fn test_arithmetic_parses_integer() {
        let problems = vec![Problem::new(12, 5, Operator::Sub)];
        let mut rng = SmallRng::seed_from_u64(0);
        let question = Question::build(StageKind::Arithmetic, &[], &problems, 0, &[], &mut rng)
            .unwrap()
            .unwrap();
        assert!(question.check(&Answer::Text("7".into())).unwrap().correct);
        assert!(!question.check(&Answer::Text("seven".into())).unwrap().correct);
        assert_eq!(question.prompt(), "12 - 5");
        assert_eq!(question.cue(), Some(Cue::Word("12 minus 5".into())));
    }

    #[test]
    fn test_walkthrough_questions_take_no_answer() {
        let items = vec![Item::new("I like cats.", "我喜欢猫。")];
        let question = build(StageKind::ReadAlong, &items);
        assert!(question.is_walkthrough());
        assert_eq!(
            question.check(&Answer::Text("ok".into())),
            Err(SessionError::InvalidAnswer)
        );
        assert_eq!(question.cue(), Some(Cue::Sentence("I like cats.".into())));
    }

    #[test]
    fn test_boards_are_not_checked_as_answers() {
        let question = build(StageKind::Matching, &words());
        assert_eq!(question.kind().validator(), Validator::Pairs);
        assert_eq!(
            question.check(&Answer::Choice(0)),
            Err(SessionError::InvalidAnswer)
        );
        assert_eq!(
            question.check(&Answer::Text("cat".into())),
            Err(SessionError::InvalidAnswer)
        );
    }

    #[test]
    fn test_sentence_fill_checks_the_chosen_word() {
        let items = vec![
            Item::new("said", "说").with_example("She said hello."),
            Item::new("come", "来").with_example("Come here."),
            Item::new("were", "是").with_example("They were late."),
        ];
        let question = build(StageKind::SentenceFill, &items);
        let options = question.options();
        let right = options.iter().position(|o| o == "said").unwrap();
        assert!(question.check(&Answer::Choice(right)).unwrap().correct);
        let wrong = (right + 1) % options.len();
        assert!(!question.check(&Answer::Choice(wrong)).unwrap().correct);
    }

    #[test]
    fn test_matching_builds_one_board_per_stage() {
        let items = words();
        let mut rng = SmallRng::seed_from_u64(3);
        let first = Question::build(StageKind::Matching, &items, &[], 0, &items, &mut rng).unwrap();
        let second = Question::build(StageKind::Matching, &items, &[], 1, &items, &mut rng).unwrap();
        assert!(matches!(first, Some(Question::Matching(ref b)) if b.pair_count() == 5));
        assert!(second.is_none());
    }

    #[test]
    fn test_teaching_cue_is_syllable_sequence() {
        let items = vec![Item::new("adventure", "冒险").with_hint("ad-ven-ture")];
        let question = build(StageKind::Teaching, &items);
        assert_eq!(
            question.cue(),
            Some(Cue::Syllables {
                units: vec!["ad".into(), "ven".into(), "ture".into()],
                word: "adventure".into(),
            })
        );
    }

    #[test]
    fn test_phonics_cue_needs_a_hint() {
        let items = vec![Item::new("ship", "船").with_hint("sh-i-p"), Item::new("said", "")];
        let with_hint = build(StageKind::Choice, &items[..1]);
        assert!(matches!(with_hint.phonics_cue(), Some(Cue::Phonics { ref units, .. }) if units.len() == 3));
        let without = build(StageKind::Choice, &items[1..]);
        assert_eq!(without.phonics_cue(), None);
    }

    #[test]
    fn test_out_of_range_index_builds_nothing() {
        let items = words();
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            Question::build(StageKind::Choice, &items, &[], 5, &items, &mut rng),
            Ok(None)
        );
    }
}
