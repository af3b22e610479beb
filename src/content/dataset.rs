use std::collections::HashMap;

use rust_embed::RustEmbed;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::content::pinyin::PinyinTable;
use crate::content::{Category, ContentProvider, Item, Subject};
use crate::error::ContentError;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

const SUBJECT_ASSETS: &[(Subject, &str)] = &[
    (Subject::Phonics, "phonics.json"),
    (Subject::LongWords, "long_words.json"),
    (Subject::IrregularWords, "irregular_words.json"),
    (Subject::ReadAlong, "read_along.json"),
];

const PINYIN_ASSET: &str = "pinyin.json";

#[derive(Deserialize)]
struct CategoryFile {
    categories: Vec<CategoryRecord>,
}

#[derive(Deserialize)]
struct CategoryRecord {
    key: String,
    name: String,
    #[serde(default)]
    example: String,
    items: Vec<Item>,
}

/// In-memory content store backed by the embedded JSON assets.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    categories: Vec<Category>,
    items: HashMap<String, Vec<Item>>,
    pinyin: PinyinTable,
}

impl Dataset {
    pub fn load() -> Result<Self, ContentError> {
        let mut dataset = Self::default();
        for &(subject, asset) in SUBJECT_ASSETS {
            let file: CategoryFile = parse_asset(asset)?;
            for record in file.categories {
                let category = Category {
                    key: record.key,
                    name: record.name,
                    example: record.example,
                    subject,
                };
                dataset.insert(category, record.items);
            }
        }
        dataset.pinyin = parse_asset(PINYIN_ASSET)?;
        tracing::debug!(
            categories = dataset.categories.len(),
            pinyin_units = dataset.pinyin.unit_count(),
            "content dataset loaded"
        );
        Ok(dataset)
    }

    /// Add or replace a category and its items.
    pub fn insert(&mut self, category: Category, items: Vec<Item>) {
        self.categories.retain(|c| c.key != category.key);
        self.items.insert(category.key.clone(), items);
        self.categories.push(category);
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn pinyin(&self) -> &PinyinTable {
        &self.pinyin
    }
}

impl ContentProvider for Dataset {
    fn list_categories(&self, subject: Subject) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|c| c.subject == subject)
            .collect()
    }

    fn items_for(&self, category: &str) -> &[Item] {
        self.items.get(category).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn parse_asset<T: DeserializeOwned>(asset: &'static str) -> Result<T, ContentError> {
    let file = Assets::get(asset).ok_or(ContentError::MissingAsset(asset))?;
    serde_json::from_slice(&file.data).map_err(|source| ContentError::Parse { asset, source })
}
