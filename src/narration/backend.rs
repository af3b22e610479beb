use std::cell::RefCell;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::rc::Rc;

use crate::error::NarrationError;
use crate::narration::{NarrationBackend, Utterance, Voice};

/// Speaks by spawning a text-to-speech program (`espeak-ng`, `espeak`,
/// `say`, or anything that takes the text as its last argument).
#[derive(Debug)]
pub struct CommandBackend {
    program: String,
    children: Vec<Child>,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            children: Vec::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self, utterance: &Utterance) -> Vec<String> {
        let name = Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.program.as_str());

        if name.starts_with("espeak") {
            let voice = utterance
                .voice
                .clone()
                .unwrap_or_else(|| espeak_voice(&utterance.lang));
            let words_per_minute = (175.0 * utterance.rate).round() as u32;
            let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;
            vec![
                "-v".to_string(),
                voice,
                "-s".to_string(),
                words_per_minute.to_string(),
                "-p".to_string(),
                pitch.to_string(),
                utterance.text.clone(),
            ]
        } else if name == "say" {
            let mut args = vec![
                "-r".to_string(),
                ((200.0 * utterance.rate).round() as u32).to_string(),
            ];
            if let Some(voice) = &utterance.voice {
                args.push("-v".to_string());
                args.push(voice.clone());
            }
            args.push(utterance.text.clone());
            args
        } else {
            vec![utterance.text.clone()]
        }
    }

    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

fn espeak_voice(lang: &str) -> String {
    if lang.starts_with("zh") {
        "cmn".to_string()
    } else {
        lang.to_lowercase()
    }
}

fn find_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

impl NarrationBackend for CommandBackend {
    fn is_available(&self) -> bool {
        find_program(&self.program).is_some()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), NarrationError> {
        self.reap();
        let child = Command::new(&self.program)
            .args(self.args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| NarrationError::Backend(format!("{}: {err}", self.program)))?;
        tracing::debug!(program = %self.program, text = %utterance.text, "speaking");
        self.children.push(child);
        Ok(())
    }

    fn cancel(&mut self) {
        for mut child in self.children.drain(..) {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandBackend {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Swallows every request.
#[derive(Clone, Debug, Default)]
pub struct NullBackend;

impl NarrationBackend for NullBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&mut self, _utterance: &Utterance) -> Result<(), NarrationError> {
        Ok(())
    }

    fn cancel(&mut self) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    Speak(Utterance),
    Cancel,
}

/// Records requests in a shared log. Clones share the log, so a test can
/// keep one handle and give the other to a sequencer.
#[derive(Clone, Debug)]
pub struct MemoryBackend {
    log: Rc<RefCell<Vec<BackendEvent>>>,
    available: bool,
    voices: Vec<Voice>,
    fail_after: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            available: true,
            voices: Vec::new(),
            fail_after: None,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    /// Fail every speak request after the first `count`.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn events(&self) -> Vec<BackendEvent> {
        self.log.borrow().clone()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                BackendEvent::Speak(u) => Some(u.clone()),
                BackendEvent::Cancel => None,
            })
            .collect()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.utterances().into_iter().map(|u| u.text).collect()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrationBackend for MemoryBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), NarrationError> {
        if let Some(limit) = self.fail_after {
            if self.utterances().len() >= limit {
                return Err(NarrationError::Backend("speech engine stopped".into()));
            }
        }
        self.log
            .borrow_mut()
            .push(BackendEvent::Speak(utterance.clone()));
        Ok(())
    }

    fn cancel(&mut self) {
        self.log.borrow_mut().push(BackendEvent::Cancel);
    }
}
