//! Text-to-speech narration.
//!
//! A [`NarrationSequencer`] owns the single "what is playing" slot: every new
//! request revokes whatever was scheduled before it. Multi-segment requests
//! are paced by fixed delays measured from the request, not by playback
//! completion, and are released by [`NarrationSequencer::tick`].

pub mod backend;
pub mod sequencer;
pub mod spoken;
pub mod voice;

use std::time::Instant;

pub use backend::{BackendEvent, CommandBackend, MemoryBackend, NullBackend};
pub use sequencer::{NarrationSequencer, SequenceOptions};

use crate::config::{SpeechConfig, VoiceProfile};
use crate::error::NarrationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

/// Voice parameters for a request.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakOptions {
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub preferred_voices: Vec<String>,
}

impl SpeakOptions {
    pub fn from_profile(profile: &VoiceProfile) -> Self {
        Self {
            lang: profile.lang.clone(),
            rate: profile.rate,
            pitch: profile.pitch,
            preferred_voices: profile.preferred_voices.clone(),
        }
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }
}

/// A single utterance as handed to a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    /// Chosen voice name; `None` uses the backend default.
    pub voice: Option<String>,
}

pub trait NarrationBackend {
    fn is_available(&self) -> bool;

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    /// Start playing. Must not block until playback ends.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), NarrationError>;

    /// Stop anything in flight.
    fn cancel(&mut self);
}

/// What the learner should hear for the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Word(String),
    Sentence(String),
    /// Syllables one by one, then the whole word.
    Syllables { units: Vec<String>, word: String },
    /// Phonics units as their sounds, then the whole word.
    Phonics { units: Vec<String>, word: String },
    /// Already-resolved Chinese text for a pinyin unit.
    Pinyin(String),
}

/// Turns cues into sequencer requests using the configured voices and pacing.
pub struct Narrator {
    sequencer: NarrationSequencer,
    speech: SpeechConfig,
}

impl Narrator {
    pub fn new(backend: Box<dyn NarrationBackend>, speech: SpeechConfig) -> Self {
        Self {
            sequencer: NarrationSequencer::new(backend),
            speech,
        }
    }

    pub fn play(&mut self, cue: &Cue, now: Instant) -> Result<(), NarrationError> {
        let english = SpeakOptions::from_profile(&self.speech.english);
        match cue {
            Cue::Word(word) => self.sequencer.speak(word, &english, now),
            Cue::Sentence(sentence) => {
                let options = english.with_rate(self.speech.sentence_rate);
                self.sequencer.speak(sentence, &options, now)
            }
            Cue::Syllables { units, word } => {
                let pacing = self.speech.syllables;
                let options = SequenceOptions::new(english, pacing, self.speech.word_rate);
                self.sequencer.speak_sequentially(units, word, &options, now)
            }
            Cue::Phonics { units, word } => {
                let sounds: Vec<String> = units.iter().map(|u| spoken::phonics_sound(u)).collect();
                let pacing = self.speech.phonics;
                let options = SequenceOptions::new(english, pacing, self.speech.word_rate);
                self.sequencer.speak_sequentially(&sounds, word, &options, now)
            }
            Cue::Pinyin(text) => {
                let options = SpeakOptions::from_profile(&self.speech.chinese)
                    .with_rate(self.speech.pinyin_rate);
                self.sequencer.speak(text, &options, now)
            }
        }
    }

    pub fn tick(&mut self, now: Instant) -> Result<usize, NarrationError> {
        self.sequencer.tick(now)
    }

    pub fn stop(&mut self) {
        self.sequencer.cancel();
    }

    pub fn sequencer(&self) -> &NarrationSequencer {
        &self.sequencer
    }
}
