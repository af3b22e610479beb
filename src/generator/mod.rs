//! Per-question material. Every generator takes the random source as a
//! parameter so callers (and tests) decide where randomness comes from.

pub mod arithmetic;
pub mod blank;
pub mod distractor;
pub mod modules;
pub mod scramble;
pub mod sentence;
