// MOODTUNE Playback Selector
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Mood → genre → track → engine. Remote catalog first, local library as
// the fallback; the session passed in is only touched once the engine has
// accepted the new track.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::agent::catalog::{CatalogTrack, SearchQuery, TrackCatalog};
use crate::agent::emotion::{EmotionLabel, GenreProfile, GenreTable, MoodCategory};
use crate::agent::library::LocalLibrary;
use crate::agent::media::{MediaEngine, MediaSource};
use crate::agent::session::{PlaybackSession, PlaybackState, TrackRef};
use crate::error::{MoodError, MoodResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorSettings {
    pub result_limit: u32,
    pub market: String,
    /// Upper bound on any single catalog call (search or preview download).
    pub catalog_timeout: Duration,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            result_limit: 20,
            market: "US".to_string(),
            catalog_timeout: Duration::from_secs(5),
        }
    }
}

pub struct PlaybackSelector {
    genres: GenreTable,
    catalog: Option<Box<dyn TrackCatalog>>,
    library: LocalLibrary,
    engine: Box<dyn MediaEngine>,
    settings: SelectorSettings,
    rng: StdRng,
}

impl PlaybackSelector {
    pub fn new(
        genres: GenreTable,
        catalog: Option<Box<dyn TrackCatalog>>,
        library: LocalLibrary,
        engine: Box<dyn MediaEngine>,
        settings: SelectorSettings,
    ) -> Self {
        if catalog.is_none() {
            info!("[SELECTOR] No remote catalog configured. Running local-only.");
        }
        Self {
            genres,
            catalog,
            library,
            engine,
            settings,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source (seeded picks in tests).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn library(&self) -> &LocalLibrary {
        &self.library
    }

    pub fn map_to_category(&self, label: EmotionLabel) -> MoodCategory {
        label.category()
    }

    pub fn profile(&self, category: MoodCategory) -> Option<&GenreProfile> {
        self.genres.get(&category)
    }

    /// Whether the engine is audibly playing right now.
    pub fn engine_playing(&self) -> bool {
        self.engine.is_playing()
    }

    async fn search_remote(&mut self, category: MoodCategory) -> MoodResult<CatalogTrack> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| MoodError::RemoteUnavailable("no catalog configured".to_string()))?;

        let genre = self
            .genres
            .get(&category)
            .and_then(|p| p.genres.choose(&mut self.rng))
            .cloned()
            .ok_or_else(|| {
                MoodError::RemoteUnavailable(format!("no genres configured for '{}'", category))
            })?;

        let query = SearchQuery {
            genre,
            limit: self.settings.result_limit,
            market: self.settings.market.clone(),
        };
        debug!("[SELECTOR] Searching catalog for genre '{}'", query.genre);

        let timeout = self.settings.catalog_timeout;
        let found = tokio::time::timeout(timeout, catalog.search(&query))
            .await
            .map_err(|_| MoodError::RemoteUnavailable(format!("search timed out after {:?}", timeout)))??;

        let playable: Vec<CatalogTrack> = found
            .into_iter()
            .filter(|t| t.preview_url.is_some())
            .collect();

        playable.choose(&mut self.rng).cloned().ok_or_else(|| {
            MoodError::RemoteUnavailable(format!("no playable results for '{}'", query.genre))
        })
    }

    fn pick_local(&mut self) -> Option<PathBuf> {
        self.library.pick(&mut self.rng)
    }

    /// Remote first, then local. `NoTrackFound` means both came up empty.
    pub async fn select_track(&mut self, category: MoodCategory) -> MoodResult<TrackRef> {
        match self.search_remote(category).await {
            Ok(track) => {
                debug!("[SELECTOR] Remote pick: {} - {}", track.artist, track.name);
                return Ok(TrackRef::Remote(track));
            }
            Err(e) if self.catalog.is_some() => {
                info!("[SELECTOR] {}; falling back to local library.", e)
            }
            Err(_) => {}
        }

        match self.pick_local() {
            Some(path) => {
                debug!("[SELECTOR] Local pick: {:?}", path);
                Ok(TrackRef::Local(path))
            }
            None => Err(MoodError::NoTrackFound(category.to_string())),
        }
    }

    async fn resolve_source(&self, track: &TrackRef) -> MoodResult<MediaSource> {
        match track {
            TrackRef::Local(path) => Ok(MediaSource::File(path.clone())),
            TrackRef::Remote(t) => {
                let locator = t
                    .preview_url
                    .as_deref()
                    .ok_or_else(|| MoodError::Engine(format!("'{}' has no playable preview", t.name)))?;
                let catalog = self
                    .catalog
                    .as_ref()
                    .ok_or_else(|| MoodError::Engine("no catalog to stream from".to_string()))?;

                let timeout = self.settings.catalog_timeout;
                let bytes = tokio::time::timeout(timeout, catalog.fetch_preview(locator))
                    .await
                    .map_err(|_| MoodError::Engine(format!("preview download timed out after {:?}", timeout)))??;
                Ok(MediaSource::Buffer(bytes))
            }
        }
    }

    /// Hand `track` to the engine. On any failure `session` is left as it was.
    pub async fn play(&mut self, session: &mut PlaybackSession, track: TrackRef) -> MoodResult<()> {
        let source = self.resolve_source(&track).await?;
        self.engine.load(source)?;
        self.engine.play()?;

        let info = track.info();
        match &info.artist {
            Some(artist) => info!("[PLAYER] ▶ Now playing: {} - {}", artist, info.name),
            None => info!("[PLAYER] ▶ Now playing: {}", info.name),
        }
        session.current = Some(track);
        session.state = PlaybackState::Playing;
        Ok(())
    }

    /// Always succeeds; stopping an idle session is a no-op.
    pub fn stop(&mut self, session: &mut PlaybackSession) {
        self.engine.stop();
        if session.state != PlaybackState::Idle {
            info!("[PLAYER] ⏹ Stopped.");
        }
        session.state = PlaybackState::Idle;
        session.current = None;
    }

    pub fn pause(&mut self, session: &mut PlaybackSession) {
        if session.state == PlaybackState::Playing {
            self.engine.pause();
            session.state = PlaybackState::Paused;
            info!("[PLAYER] ⏸ Paused.");
        }
    }

    pub fn resume(&mut self, session: &mut PlaybackSession) -> MoodResult<()> {
        if session.state == PlaybackState::Paused {
            self.engine.play()?;
            session.state = PlaybackState::Playing;
            info!("[PLAYER] ▶ Resumed.");
        }
        Ok(())
    }

    /// Pause when playing, resume when paused, nothing when idle.
    pub fn toggle(&mut self, session: &mut PlaybackSession) -> MoodResult<()> {
        match session.state {
            PlaybackState::Playing => {
                self.pause(session);
                Ok(())
            }
            PlaybackState::Paused => self.resume(session),
            PlaybackState::Idle => {
                warn!("[PLAYER] Nothing to pause or resume.");
                Ok(())
            }
        }
    }
}
