use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    /// No input within the tick rate; drives the narration schedule.
    Tick,
    Resize,
}

/// Polls the terminal on a background thread. Only key presses are
/// forwarded; releases and repeats never reach the quiz.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let event = match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            AppEvent::Key(key)
                        }
                        Ok(Event::Paste(text)) => AppEvent::Paste(text),
                        Ok(Event::Resize(_, _)) => AppEvent::Resize,
                        Ok(_) => continue,
                        Err(err) => {
                            tracing::warn!(error = %err, "terminal read failed");
                            return;
                        }
                    },
                    Ok(false) => AppEvent::Tick,
                    Err(err) => {
                        tracing::warn!(error = %err, "terminal poll failed");
                        return;
                    }
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
