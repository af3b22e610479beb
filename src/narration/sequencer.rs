use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::Pacing;
use crate::error::NarrationError;
use crate::narration::voice::select_voice;
use crate::narration::{NarrationBackend, SpeakOptions, Utterance};

/// Pacing for [`NarrationSequencer::speak_sequentially`].
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceOptions {
    pub voice: SpeakOptions,
    /// Spacing between segment start times.
    pub delay: Duration,
    /// Extra pause between the last segment and the whole phrase.
    pub tail: Duration,
    pub segment_rate: f32,
    pub phrase_rate: f32,
}

impl SequenceOptions {
    pub fn new(voice: SpeakOptions, pacing: Pacing, phrase_rate: f32) -> Self {
        Self {
            voice,
            delay: pacing.gap(),
            tail: pacing.tail(),
            segment_rate: pacing.rate,
            phrase_rate,
        }
    }
}

#[derive(Clone, Debug)]
struct Pending {
    due: Instant,
    utterance: Utterance,
}

/// Schedules utterances on a backend, one request at a time.
pub struct NarrationSequencer {
    backend: Box<dyn NarrationBackend>,
    pending: VecDeque<Pending>,
    generation: u64,
    muted: bool,
}

impl NarrationSequencer {
    pub fn new(backend: Box<dyn NarrationBackend>) -> Self {
        Self {
            backend,
            pending: VecDeque::new(),
            generation: 0,
            muted: false,
        }
    }

    /// Cancel anything scheduled or playing, then speak `text` now.
    pub fn speak(
        &mut self,
        text: &str,
        options: &SpeakOptions,
        now: Instant,
    ) -> Result<(), NarrationError> {
        if !self.begin()? {
            return Ok(());
        }
        let voice = self.voice_for(options);
        self.pending.push_back(Pending {
            due: now,
            utterance: utterance(text, options, options.rate, voice),
        });
        self.tick(now).map(|_| ())
    }

    /// Cancel anything scheduled or playing, then schedule segment `k` at
    /// `now + k * delay` and `phrase` at `now + n * delay + tail`.
    pub fn speak_sequentially(
        &mut self,
        segments: &[String],
        phrase: &str,
        options: &SequenceOptions,
        now: Instant,
    ) -> Result<(), NarrationError> {
        if !self.begin()? {
            return Ok(());
        }
        let voice = self.voice_for(&options.voice);
        let mut due = now;
        for segment in segments {
            self.pending.push_back(Pending {
                due,
                utterance: utterance(segment, &options.voice, options.segment_rate, voice.clone()),
            });
            due += options.delay;
        }
        self.pending.push_back(Pending {
            due: due + options.tail,
            utterance: utterance(phrase, &options.voice, options.phrase_rate, voice),
        });
        tracing::debug!(
            segments = segments.len(),
            generation = self.generation,
            "narration sequence scheduled"
        );
        self.tick(now).map(|_| ())
    }

    /// Revoke everything scheduled and stop playback.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending.clear();
        self.backend.cancel();
    }

    /// Release every utterance due at or before `now`. Returns how many were
    /// handed to the backend.
    pub fn tick(&mut self, now: Instant) -> Result<usize, NarrationError> {
        let mut fired = 0;
        while self.pending.front().is_some_and(|p| p.due <= now) {
            let Some(next) = self.pending.pop_front() else {
                break;
            };
            if let Err(err) = self.backend.speak(&next.utterance) {
                tracing::warn!(error = %err, "speech backend failed, narration muted");
                self.pending.clear();
                self.muted = true;
                return Err(err);
            }
            fired += 1;
        }
        Ok(fired)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of requests revoked so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Start a new request. `Ok(false)` means narration is muted.
    fn begin(&mut self) -> Result<bool, NarrationError> {
        self.cancel();
        if self.muted {
            return Ok(false);
        }
        if !self.backend.is_available() {
            self.muted = true;
            tracing::warn!("speech narration unavailable, continuing without audio");
            return Err(NarrationError::Unavailable);
        }
        Ok(true)
    }

    fn voice_for(&self, options: &SpeakOptions) -> Option<String> {
        let voices = self.backend.voices();
        select_voice(&voices, &options.preferred_voices, &options.lang).map(|v| v.name.clone())
    }
}

fn utterance(text: &str, options: &SpeakOptions, rate: f32, voice: Option<String>) -> Utterance {
    Utterance {
        text: text.to_string(),
        lang: options.lang.clone(),
        rate,
        pitch: options.pitch,
        voice,
    }
}
