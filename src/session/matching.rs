use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::Item;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// One card on the board. Tiles with the same `pair` belong together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub pair: usize,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// One side chosen, waiting for the other.
    Selected,
    Matched,
    Mismatch,
    /// Tile already matched or out of range.
    Ignored,
}

/// Words on the left in working-set order, meanings on the right shuffled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchingBoard {
    left: Vec<Tile>,
    right: Vec<Tile>,
    matched: Vec<usize>,
    selected_left: Option<usize>,
    selected_right: Option<usize>,
    mismatches: usize,
}

impl MatchingBoard {
    pub fn new<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Self {
        let left: Vec<Tile> = items
            .iter()
            .enumerate()
            .map(|(pair, item)| Tile {
                pair,
                label: item.text.clone(),
            })
            .collect();
        let mut right: Vec<Tile> = items
            .iter()
            .enumerate()
            .map(|(pair, item)| Tile {
                pair,
                label: item.meaning.clone(),
            })
            .collect();
        right.shuffle(rng);
        Self {
            left,
            right,
            matched: Vec::new(),
            selected_left: None,
            selected_right: None,
            mismatches: 0,
        }
    }

    /// Choose the tile at `index` on `side`. Once both sides hold a choice the
    /// pair is checked and both selections clear.
    pub fn select(&mut self, side: Side, index: usize) -> MatchOutcome {
        let Some(pair) = self.tiles(side).get(index).map(|t| t.pair) else {
            return MatchOutcome::Ignored;
        };
        if self.matched.contains(&pair) {
            return MatchOutcome::Ignored;
        }

        match side {
            Side::Left => self.selected_left = Some(pair),
            Side::Right => self.selected_right = Some(pair),
        }

        let (Some(left), Some(right)) = (self.selected_left, self.selected_right) else {
            return MatchOutcome::Selected;
        };
        self.selected_left = None;
        self.selected_right = None;
        if left == right {
            self.matched.push(left);
            MatchOutcome::Matched
        } else {
            self.mismatches += 1;
            MatchOutcome::Mismatch
        }
    }

    pub fn tiles(&self, side: Side) -> &[Tile] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn is_matched(&self, pair: usize) -> bool {
        self.matched.contains(&pair)
    }

    pub fn selection(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.selected_left,
            Side::Right => self.selected_right,
        }
    }

    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    pub fn pair_count(&self) -> usize {
        self.left.len()
    }

    pub fn mismatches(&self) -> usize {
        self.mismatches
    }

    pub fn is_complete(&self) -> bool {
        self.matched.len() == self.left.len()
    }

    /// Position of a pair's tile on the given side.
    pub fn position_of(&self, side: Side, pair: usize) -> Option<usize> {
        self.tiles(side).iter().position(|t| t.pair == pair)
    }
}
