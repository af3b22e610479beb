//! Plain-text screens. Every function returns the lines to print.

use crate::content::pinyin::PinyinTable;
use crate::content::{ContentProvider, Item, Subject};
use crate::session::{
    FlowKind, MatchOutcome, Progress, Question, SessionResult, Side, StageKind, Verdict,
};
use crate::session::matching::MatchingBoard;
use crate::ui::command::tile_letter;

pub fn flows() -> Vec<String> {
    FlowKind::all()
        .iter()
        .enumerate()
        .map(|(i, flow)| format!("  {}) {:<12} {}", i + 1, flow.to_key(), flow.label()))
        .collect()
}

pub fn menu_help() -> String {
    "Type a flow number or key to begin, :q to quit.".to_string()
}

/// Numbered category list for a subject, marking the chosen ones.
pub fn categories(provider: &dyn ContentProvider, subject: Subject, chosen: &[String]) -> Vec<String> {
    provider
        .list_categories(subject)
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let mark = if chosen.contains(&category.key) { "x" } else { " " };
            let mut line = format!("  [{mark}] {:>2}. {:<16} {}", i + 1, category.key, category.name);
            if !category.example.is_empty() {
                line.push_str(&format!("  ({})", category.example));
            }
            line
        })
        .collect()
}

pub fn selection_help() -> String {
    "Type category numbers or keys to toggle them, :a for all, Enter to start, :m for the menu."
        .to_string()
}

pub fn question(question: &Question, progress: &Progress) -> Vec<String> {
    let mut lines = vec![String::new(), header(question.kind(), progress)];
    match question {
        Question::Choice { options, .. } => {
            lines.push("Listen, then choose the word you heard (:s to hear it again).".to_string());
            lines.extend(numbered(options.iter().map(|o| o.text.as_str())));
        }
        Question::Blank { blank, .. } => {
            lines.push(format!("Fill in the missing letter:  {}", blank.masked));
            let letters: Vec<String> = blank.options.iter().map(char::to_string).collect();
            lines.extend(numbered(letters.iter().map(String::as_str)));
        }
        Question::Teaching { item } => {
            lines.push(format!("  {}", item.text));
            lines.push(format!("  {}", syllables(item)));
            lines.extend(meaning(item));
            lines.push("Listen along (:y syllables, :p phonics), Enter when done.".to_string());
        }
        Question::Decoding { item } => {
            lines.push(format!("Read this word aloud:  {}", item.text));
            lines.push("Enter to check the syllables.".to_string());
        }
        Question::Combination { item, fragments, .. } => {
            lines.extend(meaning(item));
            lines.push("Build the word from the pieces, = to check.".to_string());
            lines.extend(numbered(fragments.iter().map(String::as_str)));
            lines.push(built(question));
        }
        Question::Matching(board) => {
            lines.push("Match each word to its meaning, e.g. 1b.".to_string());
            lines.extend(matching_board(board));
        }
        Question::SentenceFill { fill, .. } => {
            lines.push(format!("  {}", fill.masked));
            lines.extend(numbered(fill.options.iter().map(String::as_str)));
        }
        Question::Puzzle { item, scrambled } => {
            lines.extend(meaning(item));
            lines.push(format!("Unscramble the letters:  {scrambled}"));
        }
        Question::ReadAlong { item } => {
            let tags: Vec<&str> = [item.level.as_deref(), item.theme.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if !tags.is_empty() {
                lines.push(format!("  [{}]", tags.join(" / ")));
            }
            lines.push(format!("  {}", item.text));
            lines.push("Read it aloud, Enter for the next sentence.".to_string());
        }
        Question::Arithmetic(problem) => lines.push(format!("  {}", problem.prompt())),
    }
    lines
}

fn header(kind: StageKind, progress: &Progress) -> String {
    let position = format!("{}/{}", progress.index + 1, progress.total);
    if progress.stage_count > 1 {
        format!(
            "Stage {}/{} - {}  {position}",
            progress.stage,
            progress.stage_count,
            kind.label()
        )
    } else {
        format!("{}  {position}", kind.label())
    }
}

fn numbered<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    labels
        .enumerate()
        .map(|(i, label)| format!("  {}) {label}", i + 1))
        .collect()
}

fn meaning(item: &Item) -> Option<String> {
    (!item.meaning.is_empty()).then(|| format!("  Meaning: {}", item.meaning))
}

fn syllables(item: &Item) -> String {
    item.units().join(" - ")
}

/// The fragments picked so far for a combination question.
pub fn built(question: &Question) -> String {
    let picked = question.selected_fragments();
    if picked.is_empty() {
        "  Your word: (nothing yet)".to_string()
    } else {
        format!("  Your word: {}", picked.concat())
    }
}

pub fn matching_board(board: &MatchingBoard) -> Vec<String> {
    let left = board.tiles(Side::Left);
    let right = board.tiles(Side::Right);
    let width = left.iter().map(|t| t.label.chars().count()).max().unwrap_or(0);
    left.iter()
        .zip(right)
        .enumerate()
        .map(|(i, (l, r))| {
            let l_label = if board.is_matched(l.pair) { "✓".to_string() } else { l.label.clone() };
            let r_label = if board.is_matched(r.pair) { "✓".to_string() } else { r.label.clone() };
            let l_mark = if board.selection(Side::Left) == Some(l.pair) { '>' } else { ' ' };
            let r_mark = if board.selection(Side::Right) == Some(r.pair) { '>' } else { ' ' };
            format!(
                " {l_mark}{:>2}. {l_label:<width$}   {r_mark}{}. {r_label}",
                i + 1,
                tile_letter(i)
            )
        })
        .collect()
}

pub fn verdict(verdict: &Verdict, question: &Question) -> Vec<String> {
    let mut lines = Vec::new();
    if verdict.correct {
        lines.push(format!("Correct! {}", question.expected()));
    } else {
        lines.push(format!(
            "Not quite: you said {}, the answer is {}.",
            display(&verdict.submitted),
            question.expected()
        ));
    }
    if let Some(item) = question.item() {
        if let Some(note) = &item.note {
            lines.push(format!("  Note: {note}"));
        }
    }
    lines.push("Press Enter to continue.".to_string());
    lines
}

/// Shown when a walkthrough question is revealed.
pub fn revealed(question: &Question) -> Vec<String> {
    let mut lines = Vec::new();
    if let Question::Decoding { item } = question {
        lines.push(format!("  {}", syllables(item)));
        lines.extend(meaning(item));
    }
    lines.push("Press Enter to continue.".to_string());
    lines
}

pub fn match_outcome(outcome: MatchOutcome, board: &MatchingBoard) -> Vec<String> {
    let mut lines = match outcome {
        MatchOutcome::Selected => Vec::new(),
        MatchOutcome::Matched => vec!["It's a match!".to_string()],
        MatchOutcome::Mismatch => vec!["Those don't belong together, try again.".to_string()],
        MatchOutcome::Ignored => vec!["That tile is already matched.".to_string()],
    };
    if board.is_complete() {
        lines.push(format!(
            "All {} pairs matched ({} misses). Press Enter to continue.",
            board.pair_count(),
            board.mismatches()
        ));
    }
    lines
}

pub fn result(result: &SessionResult) -> Vec<String> {
    let score = &result.score;
    let mut lines = vec![String::new(), format!("{} finished!", result.flow.label())];
    if score.total > 0 {
        lines.push(format!(
            "  Score: {}/{} ({}%)  {}",
            score.correct,
            score.total,
            score.percentage,
            score.tier.label()
        ));
    }
    if score.completed > 0 {
        lines.push(format!("  Completed: {}", score.completed));
    }
    if score.stages.len() > 1 {
        for tally in &score.stages {
            if tally.total > 0 {
                lines.push(format!("    Stage {}: {}/{}", tally.stage, tally.correct, tally.total));
            } else {
                lines.push(format!("    Stage {}: {} done", tally.stage, tally.completed));
            }
        }
    }
    let mistakes: Vec<String> = result
        .mistakes()
        .map(|r| format!("    {}: you said {}, answer {}", r.prompt, display(&r.submitted), r.expected))
        .collect();
    if !mistakes.is_empty() {
        lines.push("  To review:".to_string());
        lines.extend(mistakes);
    }
    lines.push(
        ":r to practice again, :c to change categories, :m for the menu, :q to quit.".to_string(),
    );
    lines
}

pub fn pinyin_table(table: &PinyinTable) -> Vec<String> {
    let mut lines = Vec::new();
    for category in &table.categories {
        lines.push(format!("{} ({})", category.name, category.key));
        let units: Vec<&str> = category.units.iter().map(|u| u.pinyin.as_str()).collect();
        lines.push(format!("  {}", units.join(" ")));
    }
    lines
}

fn display(submitted: &str) -> &str {
    if submitted.is_empty() { "(nothing)" } else { submitted }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::generator::arithmetic::{Operator, Problem};

    fn progress(stage: usize, stage_count: usize) -> Progress {
        Progress {
            stage,
            stage_count,
            index: 2,
            total: 5,
            answered: 2,
        }
    }

    #[test]
    fn test_single_stage_header_has_no_stage_count() {
        let question = Question::Arithmetic(Problem::new(7, 5, Operator::Add));
        let lines = super::question(&question, &progress(1, 1));
        assert_eq!(lines[1], "Arithmetic  3/5");
        assert_eq!(lines[2], "  7 + 5 = ?");
    }

    #[test]
    fn test_multi_stage_header_names_stage() {
        let question = Question::Decoding {
            item: Item::new("adventure", "冒险").with_hint("ad-ven-ture"),
        };
        let lines = super::question(&question, &progress(2, 3));
        assert!(lines[1].starts_with("Stage 2/3"));
        let shown = revealed(&question);
        assert_eq!(shown[0], "  ad - ven - ture");
    }

    #[test]
    fn test_board_rows_pair_numbers_with_letters() {
        let items: Vec<Item> = [("friend", "朋友"), ("people", "人们")]
            .iter()
            .map(|(w, m)| Item::new(w, m))
            .collect();
        let mut rng = SmallRng::seed_from_u64(3);
        let board = MatchingBoard::new(&items, &mut rng);
        let rows = matching_board(&board);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains(" 1. friend"));
        assert!(rows[1].contains("b. "));
    }

    #[test]
    fn test_wrong_verdict_shows_expected() {
        let question = Question::Arithmetic(Problem::new(7, 5, Operator::Add));
        let verdict = Verdict {
            submitted: "11".into(),
            correct: false,
        };
        let lines = super::verdict(&verdict, &question);
        assert_eq!(lines[0], "Not quite: you said 11, the answer is 12.");
    }
}
