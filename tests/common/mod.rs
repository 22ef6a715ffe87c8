// Shared fakes for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use moodtune_core::agent::camera::{Frame, FrameSource};
use moodtune_core::agent::catalog::{CatalogTrack, SearchQuery, TrackCatalog};
use moodtune_core::agent::emotion::default_genre_table;
use moodtune_core::agent::library::LocalLibrary;
use moodtune_core::agent::media::{MediaEngine, MediaSource};
use moodtune_core::agent::recognizer::{EmotionRecognizer, FaceEmotions};
use moodtune_core::agent::selector::{PlaybackSelector, SelectorSettings};
use moodtune_core::error::{MoodError, MoodResult};

use rand::rngs::StdRng;
use rand::SeedableRng;

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Yields a 1x1 frame while `online` is set.
pub struct FakeCamera {
    pub online: Arc<AtomicBool>,
}

impl FakeCamera {
    pub fn new(online: bool) -> (Self, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(online));
        (Self { online: flag.clone() }, flag)
    }
}

impl FrameSource for FakeCamera {
    fn read_frame(&mut self) -> Option<Frame> {
        if self.online.load(Ordering::SeqCst) {
            Some(Frame::new(1, 1, vec![0, 0, 0]))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Recognizer
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecognizerScript {
    /// `None` means "no face in frame".
    pub face: Arc<Mutex<Option<Vec<(String, f32)>>>>,
    pub fail: Arc<AtomicBool>,
    pub calls: Arc<AtomicUsize>,
}

impl RecognizerScript {
    pub fn show(&self, label: &str, score: f32) {
        *self.face.lock().unwrap() = Some(vec![(label.to_string(), score)]);
    }

    pub fn hide_face(&self) {
        *self.face.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub struct FakeRecognizer {
    pub script: RecognizerScript,
}

#[async_trait]
impl EmotionRecognizer for FakeRecognizer {
    async fn detect(&self, _frame: &Frame) -> MoodResult<Vec<FaceEmotions>> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        if self.script.fail.load(Ordering::SeqCst) {
            return Err(MoodError::Recognizer("model crashed".to_string()));
        }
        let face = self.script.face.lock().unwrap().clone();
        Ok(face.map(|scores| vec![FaceEmotions::new(scores)]).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct CatalogLog {
    pub queries: Arc<Mutex<Vec<SearchQuery>>>,
    pub fetched: Arc<Mutex<Vec<String>>>,
}

pub struct FakeCatalog {
    pub tracks: Vec<CatalogTrack>,
    pub fail: bool,
    pub fail_preview: bool,
    pub delay: Option<Duration>,
    pub log: CatalogLog,
}

impl FakeCatalog {
    pub fn with_tracks(tracks: Vec<CatalogTrack>) -> (Self, CatalogLog) {
        let log = CatalogLog::default();
        (
            Self {
                tracks,
                fail: false,
                fail_preview: false,
                delay: None,
                log: log.clone(),
            },
            log,
        )
    }
}

#[async_trait]
impl TrackCatalog for FakeCatalog {
    async fn search(&self, query: &SearchQuery) -> MoodResult<Vec<CatalogTrack>> {
        self.log.queries.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(MoodError::RemoteUnavailable("connection refused".to_string()));
        }
        Ok(self.tracks.clone())
    }

    async fn fetch_preview(&self, locator: &str) -> MoodResult<Vec<u8>> {
        self.log.fetched.lock().unwrap().push(locator.to_string());
        if self.fail_preview {
            return Err(MoodError::RemoteUnavailable("preview 404".to_string()));
        }
        Ok(vec![0x49, 0x44, 0x33])
    }
}

pub fn remote_track(name: &str, artist: &str) -> CatalogTrack {
    CatalogTrack {
        name: name.to_string(),
        artist: artist.to_string(),
        preview_url: Some(format!("https://previews.example/{}.mp3", name.replace(' ', "_"))),
    }
}

// ---------------------------------------------------------------------------
// Media engine
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct EngineSpy {
    pub loaded: Arc<Mutex<Vec<MediaSource>>>,
    pub playing: Arc<AtomicBool>,
    pub fail_load: Arc<AtomicBool>,
    pub stops: Arc<AtomicUsize>,
}

impl EngineSpy {
    pub fn last_loaded(&self) -> Option<MediaSource> {
        self.loaded.lock().unwrap().last().cloned()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Simulate the current track running out.
    pub fn finish_track(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }
}

pub struct FakeEngine {
    pub spy: EngineSpy,
}

impl FakeEngine {
    pub fn new() -> (Self, EngineSpy) {
        let spy = EngineSpy::default();
        (Self { spy: spy.clone() }, spy)
    }
}

impl MediaEngine for FakeEngine {
    fn load(&mut self, source: MediaSource) -> MoodResult<()> {
        if self.spy.fail_load.load(Ordering::SeqCst) {
            return Err(MoodError::Engine("unsupported codec".to_string()));
        }
        self.spy.playing.store(false, Ordering::SeqCst);
        self.spy.loaded.lock().unwrap().push(source);
        Ok(())
    }

    fn play(&mut self) -> MoodResult<()> {
        self.spy.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.spy.playing.store(false, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.spy.stops.fetch_add(1, Ordering::SeqCst);
        self.spy.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.spy.playing.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn fresh_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn library_with(dir: &Path, files: &[&str]) -> LocalLibrary {
    for f in files {
        std::fs::write(dir.join(f), b"fake audio").unwrap();
    }
    let exts: Vec<String> = [".mp3", ".wav", ".ogg", ".flac"].iter().map(|s| s.to_string()).collect();
    LocalLibrary::open(dir, &exts).unwrap()
}

pub fn selector(
    catalog: Option<Box<dyn TrackCatalog>>,
    library: LocalLibrary,
    engine: FakeEngine,
    settings: SelectorSettings,
) -> PlaybackSelector {
    PlaybackSelector::new(default_genre_table(), catalog, library, Box::new(engine), settings)
        .with_rng(StdRng::seed_from_u64(42))
}
