use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::GeneratorError;

pub const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];
pub const PLACEHOLDER: char = '_';

/// A letter fill-in question: one vowel of the word replaced by `_`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blank {
    pub masked: String,
    /// Character index of the hidden letter.
    pub position: usize,
    pub correct: char,
    pub options: Vec<char>,
}

pub fn has_maskable_position(word: &str) -> bool {
    word.chars().any(|c| VOWELS.contains(&c.to_ascii_lowercase()))
}

/// Hide one vowel of `word`. Vowels are found case-insensitively; every
/// other character keeps its case, and `correct` is the lowercase letter.
pub fn generate_blank<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Result<Blank, GeneratorError> {
    let chars: Vec<char> = word.chars().collect();
    let positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| VOWELS.contains(&c.to_ascii_lowercase()))
        .map(|(i, _)| i)
        .collect();

    let &position = positions
        .choose(rng)
        .ok_or_else(|| GeneratorError::NoMaskablePosition(word.to_string()))?;
    let correct = chars[position].to_ascii_lowercase();

    let masked: String = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| if i == position { PLACEHOLDER } else { c })
        .collect();

    let mut wrong: Vec<char> = VOWELS.iter().copied().filter(|&v| v != correct).collect();
    wrong.shuffle(rng);
    let mut options = vec![correct];
    options.extend(wrong.into_iter().take(2));
    options.shuffle(rng);

    Ok(Blank {
        masked,
        position,
        correct,
        options,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::rngs::mock::StepRng;

    use super::*;

    #[test]
    fn test_exactly_one_position_differs() {
        for seed in 0..30 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let blank = generate_blank("rainbow", &mut rng).unwrap();
            let diffs: Vec<usize> = blank
                .masked
                .chars()
                .zip("rainbow".chars())
                .enumerate()
                .filter(|(_, (m, o))| m != o)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(diffs, vec![blank.position]);
            assert!(blank.options.contains(&blank.correct));
            assert_eq!(blank.options.len(), 3);
        }
    }

    #[test]
    fn test_options_are_distinct_vowels() {
        let mut rng = SmallRng::seed_from_u64(9);
        let blank = generate_blank("cake", &mut rng).unwrap();
        let mut opts = blank.options.clone();
        opts.sort_unstable();
        opts.dedup();
        assert_eq!(opts.len(), 3);
        assert!(opts.iter().all(|c| VOWELS.contains(c)));
    }

    #[test]
    fn test_capitalised_words_keep_their_case() {
        let blank = generate_blank("Cat", &mut SmallRng::seed_from_u64(1)).unwrap();
        assert_eq!(blank.masked, "C_t");
        assert_eq!(blank.correct, 'a');

        for seed in 0..20 {
            let blank = generate_blank("Apple", &mut SmallRng::seed_from_u64(seed)).unwrap();
            let diffs: Vec<usize> = blank
                .masked
                .chars()
                .zip("Apple".chars())
                .enumerate()
                .filter(|(_, (m, o))| m != o)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(diffs, vec![blank.position]);
            assert!(blank.correct == 'a' || blank.correct == 'e');
        }
    }

    #[test]
    fn test_first_vowel_chosen_by_zero_source() {
        let mut rng = StepRng::new(0, 0);
        let blank = generate_blank("home", &mut rng).unwrap();
        assert_eq!(blank.position, 1);
        assert_eq!(blank.masked, "h_me");
    }

    #[test]
    fn test_vowelless_word_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            generate_blank("rhythm", &mut rng),
            Err(GeneratorError::NoMaskablePosition("rhythm".into()))
        );
        assert!(!has_maskable_position("sky"));
        assert!(has_maskable_position("Eat"));
    }
}
