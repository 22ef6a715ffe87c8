// MOODTUNE Core Library
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE

pub mod agent;
pub mod config;
pub mod error;
pub mod state;

pub use error::{MoodError, MoodResult};
