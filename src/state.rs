// MOODTUNE Renderable State
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE

use serde::Serialize;

use crate::agent::classifier::Detection;
use crate::agent::emotion::MoodCategory;
use crate::agent::session::{PlaybackState, TrackInfo};

/// Snapshot of one loop iteration, everything a front-end needs to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickState {
    pub detection: Option<Detection>,
    pub category: Option<MoodCategory>,
    pub playback: PlaybackState,
    pub track: Option<TrackInfo>,
    /// A new track was started during this tick.
    pub switched: bool,
    /// Non-fatal failure from this tick, if any.
    pub error: Option<String>,
}

impl TickState {
    pub fn status_line(&self) -> String {
        let emotion = match &self.detection {
            Some(d) => format!("{} ({:.0}%)", d.label, d.confidence * 100.0),
            None => "-".to_string(),
        };
        let mood = self
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let track = match &self.track {
            Some(t) => match &t.artist {
                Some(a) => format!("{} - {}", a, t.name),
                None => t.name.clone(),
            },
            None => "nothing".to_string(),
        };
        format!(
            "emotion: {} | mood: {} | {:?}: {}",
            emotion, mood, self.playback, track
        )
    }
}
