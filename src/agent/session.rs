// MOODTUNE Playback Session
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// The one mutable record of what is playing. Owned by the mood loop and
// handed to every selector call; only the selector mutates it.

use serde::Serialize;
use std::path::PathBuf;

use crate::agent::catalog::CatalogTrack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

/// A local file or a remote catalog item picked for playback.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackRef {
    Local(PathBuf),
    Remote(CatalogTrack),
}

impl TrackRef {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            TrackRef::Local(_) => SourceKind::Local,
            TrackRef::Remote(_) => SourceKind::Remote,
        }
    }

    pub fn info(&self) -> TrackInfo {
        match self {
            TrackRef::Local(path) => TrackInfo {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                artist: None,
                source: SourceKind::Local,
            },
            TrackRef::Remote(track) => TrackInfo {
                name: track.name.clone(),
                artist: Some(track.artist.clone()),
                source: SourceKind::Remote,
            },
        }
    }
}

/// Display projection of the current track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub name: String,
    pub artist: Option<String>,
    pub source: SourceKind,
}

#[derive(Debug, Default)]
pub struct PlaybackSession {
    pub(crate) state: PlaybackState,
    pub(crate) current: Option<TrackRef>,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_track(&self) -> Option<&TrackRef> {
        self.current.as_ref()
    }

    pub fn current_track_info(&self) -> Option<TrackInfo> {
        self.current.as_ref().map(|t| t.info())
    }
}
