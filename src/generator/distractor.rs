use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::Item;

pub const OPTION_COUNT: usize = 4;

/// Multiple-choice options: `correct` plus up to three distinct distractors
/// from `pool`, shuffled. Fewer than four entries come back when the pool
/// cannot supply enough distinct identifiers.
pub fn generate_options<R: Rng + ?Sized>(correct: &Item, pool: &[Item], rng: &mut R) -> Vec<Item> {
    pick_options(correct, pool, OPTION_COUNT, rng)
}

/// Like [`generate_options`] with a caller-chosen option count.
pub fn pick_options<R: Rng + ?Sized>(
    correct: &Item,
    pool: &[Item],
    count: usize,
    rng: &mut R,
) -> Vec<Item> {
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(correct.text.as_str());

    let mut others: Vec<&Item> = pool
        .iter()
        .filter(|item| seen.insert(item.text.as_str()))
        .collect();
    others.shuffle(rng);
    others.truncate(count.saturating_sub(1));

    let mut options: Vec<Item> = Vec::with_capacity(others.len() + 1);
    options.push(correct.clone());
    options.extend(others.into_iter().cloned());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn words(list: &[&str]) -> Vec<Item> {
        list.iter().map(|w| Item::new(w, "")).collect()
    }

    fn count_of(options: &[Item], text: &str) -> usize {
        options.iter().filter(|o| o.text == text).count()
    }

    #[test]
    fn test_four_unique_options_with_correct_once() {
        let pool = words(&["cat", "hat", "map", "bag", "fan", "jam"]);
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let options = generate_options(&pool[2], &pool, &mut rng);
            assert_eq!(options.len(), 4);
            assert_eq!(count_of(&options, "map"), 1);
            let unique: HashSet<&str> = options.iter().map(|o| o.text.as_str()).collect();
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn test_small_pool_degrades_gracefully() {
        let pool = words(&["cat", "hat"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let options = generate_options(&pool[0], &pool, &mut rng);
        assert_eq!(options.len(), 2);
        assert_eq!(count_of(&options, "cat"), 1);
    }

    #[test]
    fn test_duplicate_identifiers_in_pool_are_collapsed() {
        let pool = words(&["cat", "cat", "hat", "hat", "hat"]);
        let mut rng = SmallRng::seed_from_u64(3);
        let options = generate_options(&Item::new("cat", ""), &pool, &mut rng);
        assert_eq!(options.len(), 2);
        assert_eq!(count_of(&options, "cat"), 1);
        assert_eq!(count_of(&options, "hat"), 1);
    }

    #[test]
    fn test_correct_missing_from_pool_is_still_offered() {
        let pool = words(&["hat", "map", "bag", "fan"]);
        let mut rng = SmallRng::seed_from_u64(11);
        let options = generate_options(&Item::new("cat", ""), &pool, &mut rng);
        assert_eq!(options.len(), 4);
        assert_eq!(count_of(&options, "cat"), 1);
    }

    #[test]
    fn test_pick_options_honors_count() {
        let pool = words(&["said", "was", "come", "some", "one"]);
        let mut rng = SmallRng::seed_from_u64(5);
        let options = pick_options(&pool[0], &pool, 3, &mut rng);
        assert_eq!(options.len(), 3);
        assert_eq!(count_of(&options, "said"), 1);
    }

    #[test]
    fn test_correct_position_varies_across_seeds() {
        let pool = words(&["cat", "hat", "map", "bag", "fan", "jam"]);
        let positions: HashSet<usize> = (0..40)
            .map(|seed| {
                let mut rng = SmallRng::seed_from_u64(seed);
                let options = generate_options(&pool[0], &pool, &mut rng);
                options.iter().position(|o| o.text == "cat").unwrap()
            })
            .collect();
        assert!(positions.len() > 1);
    }
}
