// MOODTUNE Error Taxonomy
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Every failure the sensing and playback path can produce. None of them are
// fatal: the mood loop logs them and carries on with the next tick.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoodError {
    /// Capture device produced nothing this tick.
    #[error("no camera frame available")]
    NoFrame,

    /// The recognizer ran but found no face.
    #[error("no face detected in frame")]
    NoDetection,

    /// The recognizer itself failed (transport, decode, model crash).
    #[error("emotion recognizer failed: {0}")]
    Recognizer(String),

    /// Catalog search threw, timed out, returned nothing usable or is not configured.
    #[error("remote catalog unavailable: {0}")]
    RemoteUnavailable(String),

    /// Remote and local sources were both exhausted.
    #[error("no track found for mood '{0}'")]
    NoTrackFound(String),

    /// The media engine rejected a load or play call.
    #[error("media engine failure: {0}")]
    Engine(String),
}

pub type MoodResult<T> = Result<T, MoodError>;

impl MoodError {
    pub fn engine(err: impl std::fmt::Display) -> Self {
        MoodError::Engine(err.to_string())
    }

    pub fn remote(err: impl std::fmt::Display) -> Self {
        MoodError::RemoteUnavailable(err.to_string())
    }
}
