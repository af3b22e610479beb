use crate::narration::Voice;

fn is_chinese(lang: &str) -> bool {
    lang == "zh-CN" || lang.starts_with("zh")
}

/// Pick the voice for `lang`.
///
/// Preferred names are tried in order against voices of the right language;
/// then the first voice of the language is taken (for English, any `en`
/// voice as a last resort). `None` leaves the choice to the backend.
pub fn select_voice<'a>(voices: &'a [Voice], preferred: &[String], lang: &str) -> Option<&'a Voice> {
    let chinese = is_chinese(lang);
    let speaks_lang = |voice: &Voice| {
        if chinese {
            voice.lang.contains("zh")
        } else {
            voice.lang.contains(lang)
        }
    };

    for name in preferred {
        if let Some(voice) = voices
            .iter()
            .find(|&v| v.name.contains(name.as_str()) && speaks_lang(v))
        {
            return Some(voice);
        }
    }

    if chinese {
        voices
            .iter()
            .find(|v| v.lang.contains("zh-CN") || v.lang.contains("zh_CN"))
    } else {
        voices
            .iter()
            .find(|v| v.lang == lang || v.lang.starts_with(lang))
            .or_else(|| voices.iter().find(|v| v.lang.starts_with("en")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str) -> Voice {
        Voice {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preferred_name_wins_in_order() {
        let voices = vec![
            voice("Fred", "en-US"),
            voice("Alex", "en-US"),
            voice("Samantha", "en-US"),
        ];
        let chosen = select_voice(&voices, &names(&["Samantha", "Alex"]), "en-US").unwrap();
        assert_eq!(chosen.name, "Samantha");
    }

    #[test]
    fn test_preferred_name_needs_matching_language() {
        let voices = vec![voice("Samantha", "fr-FR"), voice("Fred", "en-US")];
        let chosen = select_voice(&voices, &names(&["Samantha"]), "en-US").unwrap();
        assert_eq!(chosen.name, "Fred");
    }

    #[test]
    fn test_english_falls_back_to_any_en_voice() {
        let voices = vec![voice("Amelie", "fr-FR"), voice("Daniel", "en-GB")];
        let chosen = select_voice(&voices, &[], "en-US").unwrap();
        assert_eq!(chosen.name, "Daniel");
    }

    #[test]
    fn test_chinese_prefers_named_zh_voice() {
        let voices = vec![voice("Sinji", "zh-HK"), voice("Tingting", "zh-CN")];
        let chosen = select_voice(&voices, &names(&["Tingting"]), "zh-CN").unwrap();
        assert_eq!(chosen.name, "Tingting");
    }

    #[test]
    fn test_chinese_fallback_accepts_underscore_locale() {
        let voices = vec![voice("Sinji", "zh-HK"), voice("Local", "zh_CN")];
        let chosen = select_voice(&voices, &[], "zh-CN").unwrap();
        assert_eq!(chosen.name, "Local");
    }

    #[test]
    fn test_no_match_defers_to_backend() {
        let voices = vec![voice("Amelie", "fr-FR")];
        assert!(select_voice(&voices, &[], "zh-CN").is_none());
        assert!(select_voice(&[], &names(&["Alex"]), "en-US").is_none());
    }
}
