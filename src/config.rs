use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::generator::arithmetic::{Difficulty, QUESTION_COUNTS};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_session_size")]
    pub session_size: usize,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub speech: SpeechConfig,
}

fn default_session_size() -> usize {
    10
}
fn default_difficulty() -> String {
    Difficulty::Easy.to_key().to_string()
}
fn default_question_count() -> usize {
    20
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_size: default_session_size(),
            difficulty: default_difficulty(),
            question_count: default_question_count(),
            log_level: default_log_level(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize_difficulty();
            config.normalize_question_count();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("learnpark")
            .join("config.toml")
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_key(&self.difficulty).unwrap_or_default()
    }

    /// Reset an unknown difficulty key to the default.
    pub fn normalize_difficulty(&mut self) {
        if Difficulty::from_key(&self.difficulty).is_none() {
            self.difficulty = default_difficulty();
        }
    }

    /// Snap `question_count` to the nearest offered count.
    pub fn normalize_question_count(&mut self) {
        let requested = self.question_count;
        self.question_count = QUESTION_COUNTS
            .iter()
            .copied()
            .min_by_key(|&count| count.abs_diff(requested))
            .unwrap_or_else(default_question_count);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Text-to-speech program, e.g. `espeak-ng`. Unset picks one from `PATH`.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default = "default_english_voice")]
    pub english: VoiceProfile,
    #[serde(default = "default_chinese_voice")]
    pub chinese: VoiceProfile,
    #[serde(default = "default_syllable_pacing")]
    pub syllables: Pacing,
    #[serde(default = "default_phonics_pacing")]
    pub phonics: Pacing,
    #[serde(default = "default_word_rate")]
    pub word_rate: f32,
    #[serde(default = "default_sentence_rate")]
    pub sentence_rate: f32,
    #[serde(default = "default_pinyin_rate")]
    pub pinyin_rate: f32,
}

fn default_true() -> bool {
    true
}
fn default_english_voice() -> VoiceProfile {
    VoiceProfile {
        lang: "en-US".to_string(),
        rate: 0.75,
        pitch: 1.0,
        preferred_voices: [
            "Samantha",
            "Alex",
            "Google US English",
            "Microsoft David",
            "Microsoft Zira",
        ]
        .map(String::from)
        .to_vec(),
    }
}
fn default_chinese_voice() -> VoiceProfile {
    VoiceProfile {
        lang: "zh-CN".to_string(),
        rate: 0.7,
        pitch: 1.0,
        preferred_voices: [
            "Tingting",
            "Ting-Ting",
            "Huihui",
            "Yaoyao",
            "Google 普通话",
            "Google 中文",
        ]
        .map(String::from)
        .to_vec(),
    }
}
fn default_syllable_pacing() -> Pacing {
    Pacing {
        gap_ms: 600,
        tail_ms: 400,
        rate: 0.5,
    }
}
fn default_phonics_pacing() -> Pacing {
    Pacing {
        gap_ms: 700,
        tail_ms: 300,
        rate: 0.6,
    }
}
fn default_word_rate() -> f32 {
    0.7
}
fn default_sentence_rate() -> f32 {
    0.8
}
fn default_pinyin_rate() -> f32 {
    0.5
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            command: None,
            english: default_english_voice(),
            chinese: default_chinese_voice(),
            syllables: default_syllable_pacing(),
            phonics: default_phonics_pacing(),
            word_rate: default_word_rate(),
            sentence_rate: default_sentence_rate(),
            pinyin_rate: default_pinyin_rate(),
        }
    }
}

/// Language, speed and voice preferences for one narration language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub lang: String,
    pub rate: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    #[serde(default)]
    pub preferred_voices: Vec<String>,
}

fn default_pitch() -> f32 {
    1.0
}

/// Timing of a segment-by-segment narration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pacing {
    pub gap_ms: u64,
    pub tail_ms: u64,
    pub rate: f32,
}

impl Pacing {
    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }

    pub fn tail(&self) -> Duration {
        Duration::from_millis(self.tail_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.session_size, 10);
        assert_eq!(config.difficulty, "easy");
        assert_eq!(config.question_count, 20);
        assert_eq!(config.log_level, "warn");
        assert!(config.speech.enabled);
        assert!(config.speech.command.is_none());
        assert_eq!(config.speech.syllables.gap_ms, 600);
        assert_eq!(config.speech.phonics.tail_ms, 300);
    }

    #[test]
    fn test_config_partial_speech_table() {
        let toml_str = r#"
session_size = 6

[speech]
command = "espeak-ng"

[speech.english]
lang = "en-GB"
rate = 0.9
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session_size, 6);
        assert_eq!(config.speech.command.as_deref(), Some("espeak-ng"));
        assert_eq!(config.speech.english.lang, "en-GB");
        assert_eq!(config.speech.english.pitch, 1.0);
        assert!(config.speech.english.preferred_voices.is_empty());
        assert_eq!(config.speech.chinese.lang, "zh-CN");
        assert_eq!(config.speech.word_rate, 0.7);
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.session_size = 12;
        config.difficulty = "hard".to_string();
        config.speech.command = Some("say".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.session_size, 12);
        assert_eq!(loaded.difficulty(), Difficulty::Hard);
        assert_eq!(loaded.speech.command.as_deref(), Some("say"));
        assert_eq!(loaded.speech.chinese, config.speech.chinese);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.session_size, 10);
    }

    #[test]
    fn test_normalize_difficulty() {
        let mut config = Config {
            difficulty: "nightmare".to_string(),
            ..Config::default()
        };
        config.normalize_difficulty();
        assert_eq!(config.difficulty, "easy");
        assert_eq!(config.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_normalize_question_count_snaps() {
        let mut config = Config::default();
        for (input, expected) in [(0, 10), (14, 10), (16, 20), (26, 30), (500, 30)] {
            config.question_count = input;
            config.normalize_question_count();
            assert_eq!(config.question_count, expected, "input {input}");
        }
    }

    #[test]
    fn test_pacing_durations() {
        let pacing = default_phonics_pacing();
        assert_eq!(pacing.gap(), Duration::from_millis(700));
        assert_eq!(pacing.tail(), Duration::from_millis(300));
    }
}
