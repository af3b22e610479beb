use rand::Rng;
use rand::seq::SliceRandom;

/// Random permutation of the characters of `word`. May equal the input.
pub fn scramble<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    chars.shuffle(rng);
    chars.into_iter().collect()
}
