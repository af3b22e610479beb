use rand::Rng;
use regex::Regex;

use crate::content::Item;
use crate::generator::distractor::pick_options;

pub const BLANK: &str = "______";
pub const SENTENCE_OPTION_COUNT: usize = 3;

/// A sentence with the target word blanked out and word options to fill it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentenceFill {
    pub masked: String,
    pub options: Vec<String>,
}

/// Replace whole-word, case-insensitive occurrences of `word` with [`BLANK`].
pub fn mask_word(sentence: &str, word: &str) -> String {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(sentence, BLANK).into_owned(),
        Err(_) => sentence.to_string(),
    }
}

/// Blank `item` out of its example sentence and offer it alongside up to two
/// other words from `pool`. Items without a sentence show the blank alone.
pub fn generate_sentence_fill<R: Rng + ?Sized>(
    item: &Item,
    pool: &[Item],
    rng: &mut R,
) -> SentenceFill {
    let masked = match item.example.as_deref() {
        Some(sentence) => mask_word(sentence, &item.text),
        None => BLANK.to_string(),
    };
    let options = pick_options(item, pool, SENTENCE_OPTION_COUNT, rng)
        .into_iter()
        .map(|option| option.text)
        .collect();
    SentenceFill { masked, options }
}
