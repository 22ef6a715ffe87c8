// MOODTUNE Agent Modules
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE

pub mod camera;
pub mod catalog;
pub mod classifier;
pub mod emotion;
pub mod health;
pub mod library;
pub mod media;
pub mod mood_loop;
pub mod recognizer;
pub mod selector;
pub mod session;

pub use classifier::{Detection, EmotionClassifier};
pub use emotion::{map_to_category, EmotionLabel, MoodCategory};
pub use mood_loop::{LoopCommand, MoodLoop};
pub use selector::PlaybackSelector;
pub use session::{PlaybackSession, PlaybackState, TrackRef};
