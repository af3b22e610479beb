pub mod command;
pub mod progress_bar;
pub mod render;
