use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::Item;

pub const MAX_MODULES: usize = 8;

pub const AFFIXES: &[&str] = &[
    "ing", "tion", "ness", "ful", "less", "pre", "un", "dis", "er", "est", "ly", "ment",
];

/// Word-building fragments for a combination question.
///
/// Every correct unit of `item` is present. Distractors come from the affix
/// list and the units of `siblings` (other than `item` itself) and fill the
/// pool up to [`MAX_MODULES`]; a word with more units than that gets no
/// distractors at all.
pub fn generate_module_pool<R: Rng + ?Sized>(
    item: &Item,
    siblings: &[Item],
    rng: &mut R,
) -> Vec<String> {
    let correct = item.units();

    let sibling_units = siblings
        .iter()
        .filter(|s| s.text != item.text)
        .flat_map(|s| s.units());

    let mut distractors: Vec<&str> = Vec::new();
    for candidate in AFFIXES.iter().copied().chain(sibling_units) {
        if !correct.contains(&candidate) && !distractors.contains(&candidate) {
            distractors.push(candidate);
        }
    }
    distractors.shuffle(rng);
    distractors.truncate(MAX_MODULES.saturating_sub(correct.len()));

    let mut pool: Vec<String> = correct
        .iter()
        .chain(distractors.iter())
        .map(|s| s.to_string())
        .collect();
    pool.shuffle(rng);
    pool
}
