// Library target: the binary in main.rs, the integration tests and the
// criterion benches all go through this module tree.

pub mod app;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod logging;
pub mod narration;
pub mod session;
pub mod ui;
