pub mod dataset;
pub mod pinyin;

pub use dataset::Dataset;

use serde::{Deserialize, Serialize};

/// Which part of the dataset a category belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Phonics,
    LongWords,
    IrregularWords,
    ReadAlong,
}

impl Subject {
    pub fn to_key(self) -> &'static str {
        match self {
            Subject::Phonics => "phonics",
            Subject::LongWords => "long_words",
            Subject::IrregularWords => "irregular_words",
            Subject::ReadAlong => "read_along",
        }
    }

    pub fn all() -> &'static [Subject] {
        &[
            Subject::Phonics,
            Subject::LongWords,
            Subject::IrregularWords,
            Subject::ReadAlong,
        ]
    }
}

/// One unit of content: a word, long word, irregular word or read-along sentence.
///
/// Subject-specific fields are optional: `hint` holds the phonics breakdown
/// (`c-a-t`) or the syllables (`ad-ven-ture`), `example` the sentence an
/// irregular word is drilled in, `level`/`theme` the read-along tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub text: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl Item {
    pub fn new(text: &str, meaning: &str) -> Self {
        Self {
            text: text.to_string(),
            meaning: meaning.to_string(),
            hint: None,
            example: None,
            note: None,
            level: None,
            theme: None,
        }
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }

    /// Decomposition units: the hint split on `-`, or the whole word when
    /// there is no hint.
    pub fn units(&self) -> Vec<&str> {
        match self.hint.as_deref() {
            Some(hint) => {
                let parts: Vec<&str> = hint.split('-').filter(|p| !p.is_empty()).collect();
                if parts.is_empty() {
                    vec![self.text.as_str()]
                } else {
                    parts
                }
            }
            None => vec![self.text.as_str()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub name: String,
    pub example: String,
    pub subject: Subject,
}

/// Read-only lookup of categorized content.
pub trait ContentProvider {
    fn list_categories(&self, subject: Subject) -> Vec<&Category>;

    /// Items of a category, empty for unknown keys.
    fn items_for(&self, category: &str) -> &[Item];

    fn all_items(&self, subject: Subject) -> Vec<Item> {
        self.list_categories(subject)
            .iter()
            .flat_map(|category| self.items_for(&category.key).iter().cloned())
            .collect()
    }
}

pub fn day_key(day: u32) -> String {
    format!("day_{day}")
}

pub fn day_from_key(key: &str) -> Option<u32> {
    key.strip_prefix("day_")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_split_hint_on_dashes() {
        let item = Item::new("adventure", "冒险").with_hint("ad-ven-ture");
        assert_eq!(item.units(), vec!["ad", "ven", "ture"]);
    }

    #[test]
    fn test_units_fall_back_to_whole_word() {
        let item = Item::new("said", "说");
        assert_eq!(item.units(), vec!["said"]);
    }

    #[test]
    fn test_day_keys_round_trip() {
        assert_eq!(day_key(7), "day_7");
        assert_eq!(day_from_key("day_14"), Some(14));
        assert_eq!(day_from_key("short_a"), None);
    }
}
