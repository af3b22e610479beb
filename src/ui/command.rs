use crate::session::{Side, StageKind};

/// A line typed by the learner, interpreted for the active question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Replay,
    Phonics,
    Syllables,
    Restart,
    /// Back to the flow menu.
    Menu,
    /// Back to category selection, keeping the last choices.
    Categories,
    OtherDay,
    SelectAll,
    /// Empty line: start, reveal or move on.
    Continue,
    /// 0-based option, fragment or category number.
    Pick(usize),
    Tile(Side, usize),
    /// Left and right tile in one go, e.g. `2c`.
    Pair(usize, usize),
    /// Submit the selected fragments.
    Check,
    Text(String),
}

pub fn parse(line: &str, kind: Option<StageKind>) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Continue;
    }
    if let Some(meta) = trimmed.strip_prefix(':') {
        match meta.to_lowercase().as_str() {
            "q" | "quit" => return Command::Quit,
            "s" | "say" => return Command::Replay,
            "p" | "phonics" => return Command::Phonics,
            "y" | "syllables" => return Command::Syllables,
            "r" | "restart" => return Command::Restart,
            "m" | "menu" => return Command::Menu,
            "c" | "categories" => return Command::Categories,
            "d" | "day" => return Command::OtherDay,
            "a" | "all" => return Command::SelectAll,
            _ => {}
        }
    }

    match kind {
        Some(StageKind::Choice | StageKind::Blank | StageKind::SentenceFill) => {
            number(trimmed).map_or_else(|| Command::Text(trimmed.to_string()), Command::Pick)
        }
        Some(StageKind::Combination) => {
            if trimmed == "=" || trimmed.eq_ignore_ascii_case("ok") {
                Command::Check
            } else {
                number(trimmed).map_or_else(|| Command::Text(trimmed.to_string()), Command::Pick)
            }
        }
        Some(StageKind::Matching) => parse_tiles(trimmed),
        None => number(trimmed).map_or_else(|| Command::Text(trimmed.to_string()), Command::Pick),
        _ => Command::Text(trimmed.to_string()),
    }
}

/// Label of the right-hand tile at `index`: `a`, `b`, ...
pub fn tile_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'a'.checked_add(i))
        .filter(u8::is_ascii_lowercase)
        .map_or('?', char::from)
}

fn number(text: &str) -> Option<usize> {
    text.parse::<usize>().ok()?.checked_sub(1)
}

fn letter(text: &str) -> Option<usize> {
    let mut chars = text.chars();
    let c = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() || !c.is_ascii_lowercase() {
        return None;
    }
    Some(usize::from(c as u8 - b'a'))
}

fn parse_tiles(text: &str) -> Command {
    if let Some(left) = number(text) {
        return Command::Tile(Side::Left, left);
    }
    if let Some(right) = letter(text) {
        return Command::Tile(Side::Right, right);
    }
    let split = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let (digits, rest) = text.split_at(split);
    match (number(digits), letter(rest.trim())) {
        (Some(left), Some(right)) => Command::Pair(left, right),
        _ => Command::Text(text.to_string()),
    }
}
