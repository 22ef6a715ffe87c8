// MOODTUNE Media Engine
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Playback is delegated to rodio. The engine only knows how to load one
// source at a time and flip its transport state.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{MoodError, MoodResult};

/// What the engine should load.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    File(PathBuf),
    /// Remote preview already downloaded into memory.
    Buffer(Vec<u8>),
}

pub trait MediaEngine {
    /// Replace whatever is loaded. Loaded media starts paused.
    fn load(&mut self, source: MediaSource) -> MoodResult<()>;
    fn play(&mut self) -> MoodResult<()>;
    fn pause(&mut self);
    fn stop(&mut self);
    /// True while audio is audibly advancing.
    fn is_playing(&self) -> bool;
}

pub struct RodioEngine {
    // Dropping the stream silences every sink, so it lives as long as the engine.
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
    sink: Option<rodio::Sink>,
}

impl RodioEngine {
    pub fn new() -> MoodResult<Self> {
        let (stream, handle) = rodio::OutputStream::try_default().map_err(MoodError::engine)?;
        info!("[PLAYER] Audio output ready.");
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
        })
    }
}

impl MediaEngine for RodioEngine {
    fn load(&mut self, source: MediaSource) -> MoodResult<()> {
        let sink = rodio::Sink::try_new(&self.handle).map_err(MoodError::engine)?;
        sink.pause();

        match source {
            MediaSource::File(path) => {
                debug!("[PLAYER] Loading {:?}", path);
                let file = File::open(&path).map_err(MoodError::engine)?;
                let decoder = rodio::Decoder::new(BufReader::new(file)).map_err(MoodError::engine)?;
                sink.append(decoder);
            }
            MediaSource::Buffer(bytes) => {
                debug!("[PLAYER] Loading {} byte stream", bytes.len());
                let decoder = rodio::Decoder::new(Cursor::new(bytes)).map_err(MoodError::engine)?;
                sink.append(decoder);
            }
        }

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        Ok(())
    }

    fn play(&mut self) -> MoodResult<()> {
        match &self.sink {
            Some(sink) => {
                sink.play();
                Ok(())
            }
            None => Err(MoodError::Engine("nothing loaded".to_string())),
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map(|s| !s.is_paused() && !s.empty())
            .unwrap_or(false)
    }
}
