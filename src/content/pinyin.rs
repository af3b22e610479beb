use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PinyinTable {
    pub categories: Vec<PinyinCategory>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PinyinCategory {
    pub key: String,
    pub name: String,
    pub units: Vec<PinyinUnit>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PinyinUnit {
    pub pinyin: String,
    pub example: String,
    pub words: Vec<String>,
}

impl PinyinTable {
    pub fn category(&self, key: &str) -> Option<&PinyinCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// First unit with this spelling, searching categories in table order.
    pub fn find(&self, pinyin: &str) -> Option<&PinyinUnit> {
        self.categories
            .iter()
            .flat_map(|c| c.units.iter())
            .find(|u| u.pinyin == pinyin)
    }

    pub fn unit_count(&self) -> usize {
        self.categories.iter().map(|c| c.units.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PinyinTable {
        serde_json::from_str(
            r#"{"categories":[
                {"key":"shengmu","name":"声母","units":[{"pinyin":"b","example":"爸爸 bàba","words":["爸","包"]}]},
                {"key":"fuyunmu","name":"复韵母","units":[{"pinyin":"ai","example":"爱 ài","words":["爱","矮"]}]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_searches_every_category() {
        let table = table();
        assert_eq!(table.find("ai").unwrap().words[0], "爱");
        assert!(table.find("zh").is_none());
        assert_eq!(table.unit_count(), 2);
    }

    #[test]
    fn test_category_lookup_by_key() {
        let table = table();
        assert_eq!(table.category("shengmu").unwrap().name, "声母");
        assert!(table.category("houbi").is_none());
    }
}
