mod common;

use common::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use moodtune_core::agent::catalog::TrackCatalog;
use moodtune_core::agent::classifier::EmotionClassifier;
use moodtune_core::agent::emotion::MoodCategory;
use moodtune_core::agent::mood_loop::{LoopCommand, LoopSettings, MoodLoop};
use moodtune_core::agent::selector::SelectorSettings;
use moodtune_core::agent::session::{PlaybackState, SourceKind};

struct Rig {
    mood_loop: MoodLoop,
    script: RecognizerScript,
    camera: Arc<AtomicBool>,
    engine: EngineSpy,
}

fn rig(dir: &Path, files: &[&str], catalog: Option<Box<dyn TrackCatalog>>, settings: LoopSettings) -> Rig {
    let (camera, camera_flag) = FakeCamera::new(true);
    let script = RecognizerScript::default();
    let classifier = EmotionClassifier::new(
        Box::new(camera),
        Box::new(FakeRecognizer { script: script.clone() }),
        Duration::ZERO,
        0.5,
    );
    let (engine, spy) = FakeEngine::new();
    let sel = selector(catalog, library_with(dir, files), engine, SelectorSettings::default());
    Rig {
        mood_loop: MoodLoop::new(classifier, sel, settings),
        script,
        camera: camera_flag,
        engine: spy,
    }
}

fn settings(switch_delay_secs: u64) -> LoopSettings {
    LoopSettings {
        switch_delay: Duration::from_secs(switch_delay_secs),
        poll_interval: Duration::from_millis(1),
        enforce_confidence: false,
    }
}

#[tokio::test]
async fn test_tick_plays_matching_remote_track() {
    let dir = fresh_dir("moodtune_loop_remote");
    let (catalog, _log) = FakeCatalog::with_tracks(vec![remote_track("Le Freak", "Chic")]);
    let mut r = rig(&dir, &[], Some(Box::new(catalog)), settings(5));
    r.script.show("happy", 0.88);

    let state = r.mood_loop.tick().await;
    assert!(state.switched);
    assert_eq!(state.category, Some(MoodCategory::Happy));
    assert_eq!(state.playback, PlaybackState::Playing);
    let track = state.track.unwrap();
    assert_eq!(track.name, "Le Freak");
    assert_eq!(track.source, SourceKind::Remote);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_same_mood_does_not_restart_track() {
    let dir = fresh_dir("moodtune_loop_same");
    let mut r = rig(&dir, &["a.mp3", "b.mp3"], None, settings(0));
    r.script.show("sad", 0.9);
    let t0 = Instant::now();

    assert!(r.mood_loop.tick_at(t0).await.switched);
    let second = r.mood_loop.tick_at(t0 + Duration::from_secs(10)).await;
    assert!(!second.switched);
    assert_eq!(r.engine.loaded.lock().unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_switch_delay_suppresses_flapping() {
    let dir = fresh_dir("moodtune_loop_delay");
    let mut r = rig(&dir, &["mix.mp3"], None, settings(5));
    let t0 = Instant::now();

    r.script.show("happy", 0.9);
    assert!(r.mood_loop.tick_at(t0).await.switched);

    r.script.show("angry", 0.9);
    let early = r.mood_loop.tick_at(t0 + Duration::from_secs(1)).await;
    assert_eq!(early.category, Some(MoodCategory::Energetic));
    assert!(!early.switched);

    let late = r.mood_loop.tick_at(t0 + Duration::from_secs(6)).await;
    assert!(late.switched);
    assert_eq!(r.engine.loaded.lock().unwrap().len(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_finished_track_is_replaced() {
    let dir = fresh_dir("moodtune_loop_finished");
    let mut r = rig(&dir, &["loop.wav"], None, settings(0));
    r.script.show("neutral", 0.9);
    let t0 = Instant::now();

    assert!(r.mood_loop.tick_at(t0).await.switched);
    r.engine.finish_track();
    let next = r.mood_loop.tick_at(t0 + Duration::from_secs(1)).await;
    assert!(next.switched);
    assert!(r.engine.is_playing());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_paused_session_is_left_alone() {
    let dir = fresh_dir("moodtune_loop_paused");
    let mut r = rig(&dir, &["calm.ogg"], None, settings(0));
    let t0 = Instant::now();

    r.script.show("fear", 0.9);
    assert!(r.mood_loop.tick_at(t0).await.switched);
    r.mood_loop.pause();

    r.script.show("happy", 0.9);
    let state = r.mood_loop.tick_at(t0 + Duration::from_secs(30)).await;
    assert!(!state.switched);
    assert_eq!(state.playback, PlaybackState::Paused);

    r.mood_loop.resume().unwrap();
    assert_eq!(r.mood_loop.session().state(), PlaybackState::Playing);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_no_frame_tick_changes_nothing() {
    let dir = fresh_dir("moodtune_loop_noframe");
    let mut r = rig(&dir, &["x.mp3"], None, settings(0));
    r.camera.store(false, Ordering::SeqCst);
    r.script.show("happy", 0.9);

    let state = r.mood_loop.tick().await;
    assert!(state.detection.is_none());
    assert!(!state.switched);
    assert_eq!(state.playback, PlaybackState::Idle);
    assert_eq!(r.script.calls(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_empty_library_reports_error_without_crashing() {
    let dir = fresh_dir("moodtune_loop_empty");
    let mut r = rig(&dir, &[], None, settings(0));
    r.script.show("disgust", 0.9);

    let state = r.mood_loop.tick().await;
    assert!(!state.switched);
    assert_eq!(state.playback, PlaybackState::Idle);
    assert!(state.error.unwrap().contains("energetic"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_low_confidence_drives_playback_by_default() {
    let dir = fresh_dir("moodtune_loop_lowconf");
    let mut r = rig(&dir, &["x.mp3"], None, settings(0));
    r.script.show("sad", 0.1);

    let state = r.mood_loop.tick().await;
    assert!(!state.detection.unwrap().confident);
    assert!(state.switched);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_enforced_confidence_skips_weak_detections() {
    let dir = fresh_dir("moodtune_loop_enforced");
    let mut strict = settings(0);
    strict.enforce_confidence = true;
    let mut r = rig(&dir, &["x.mp3"], None, strict);
    r.script.show("sad", 0.1);

    let state = r.mood_loop.tick().await;
    assert_eq!(state.category, Some(MoodCategory::Sad));
    assert!(!state.switched);
    assert_eq!(state.playback, PlaybackState::Idle);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_run_exits_on_stop_flag_and_stops_playback() {
    let dir = fresh_dir("moodtune_loop_run");
    let mut r = rig(&dir, &["x.mp3"], None, settings(0));
    r.script.show("happy", 0.9);
    r.mood_loop.tick().await;
    assert!(r.engine.is_playing());

    let stop = Arc::new(AtomicBool::new(true));
    let (_tx, rx) = mpsc::channel(1);
    r.mood_loop.run(stop, rx).await;

    assert_eq!(r.mood_loop.session().state(), PlaybackState::Idle);
    assert!(!r.engine.is_playing());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_stop_control_then_ticking_picks_again() {
    let dir = fresh_dir("moodtune_loop_stop_resume");
    let mut r = rig(&dir, &["x.mp3"], None, settings(5));
    r.script.show("happy", 0.9);
    let t0 = Instant::now();

    assert!(r.mood_loop.tick_at(t0).await.switched);
    assert!(r.mood_loop.apply(LoopCommand::Stop));
    assert_eq!(r.mood_loop.session().state(), PlaybackState::Idle);
    assert!(!r.engine.is_playing());

    // Still inside the switch delay: stays silent.
    let early = r.mood_loop.tick_at(t0 + Duration::from_secs(1)).await;
    assert!(!early.switched);
    assert_eq!(early.playback, PlaybackState::Idle);

    let later = r.mood_loop.tick_at(t0 + Duration::from_secs(6)).await;
    assert!(later.switched);
    assert_eq!(later.playback, PlaybackState::Playing);
    assert_eq!(r.engine.loaded.lock().unwrap().len(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_toggle_control_pauses_and_resumes() {
    let dir = fresh_dir("moodtune_loop_toggle");
    let mut r = rig(&dir, &["x.mp3"], None, settings(0));
    r.script.show("sad", 0.9);
    r.mood_loop.tick().await;

    assert!(r.mood_loop.apply(LoopCommand::Toggle));
    assert_eq!(r.mood_loop.session().state(), PlaybackState::Paused);
    assert!(r.mood_loop.apply(LoopCommand::Toggle));
    assert_eq!(r.mood_loop.session().state(), PlaybackState::Playing);
    assert!(!r.mood_loop.apply(LoopCommand::Quit));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_control_parsing() {
    assert_eq!(LoopCommand::parse("p"), Some(LoopCommand::Toggle));
    assert_eq!(LoopCommand::parse(" Pause "), Some(LoopCommand::Toggle));
    assert_eq!(LoopCommand::parse("s"), Some(LoopCommand::Stop));
    assert_eq!(LoopCommand::parse("Q"), Some(LoopCommand::Quit));
    assert_eq!(LoopCommand::parse("louder"), None);
}

#[tokio::test]
async fn test_run_exits_on_quit_control() {
    let dir = fresh_dir("moodtune_loop_quit");
    let mut r = rig(&dir, &["x.mp3"], None, settings(0));
    r.script.show("happy", 0.9);

    let (tx, rx) = mpsc::channel(4);
    tx.send(LoopCommand::Quit).await.unwrap();
    let stop = Arc::new(AtomicBool::new(false));
    tokio::time::timeout(Duration::from_secs(5), r.mood_loop.run(stop, rx))
        .await
        .unwrap();

    assert_eq!(r.mood_loop.session().state(), PlaybackState::Idle);
    assert!(!r.engine.is_playing());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_finished_track_with_empty_library_goes_idle() {
    let dir = fresh_dir("moodtune_loop_finished_empty");
    let mut r = rig(&dir, &["only.mp3"], None, settings(0));
    r.script.show("neutral", 0.9);
    let t0 = Instant::now();

    assert!(r.mood_loop.tick_at(t0).await.switched);
    std::fs::remove_file(dir.join("only.mp3")).unwrap();
    r.engine.finish_track();

    let state = r.mood_loop.tick_at(t0 + Duration::from_secs(1)).await;
    assert!(!state.switched);
    assert!(state.error.unwrap().contains("neutral"));
    assert_eq!(state.playback, PlaybackState::Idle);
    assert!(state.track.is_none());

    let _ = std::fs::remove_dir_all(&dir);
}
