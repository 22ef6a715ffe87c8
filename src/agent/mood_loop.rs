// MOODTUNE Mood Loop
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Sample → map → maybe switch track → report. One tick per poll interval,
// single task, no shared state beyond the session this loop owns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::agent::classifier::EmotionClassifier;
use crate::agent::emotion::MoodCategory;
use crate::agent::selector::PlaybackSelector;
use crate::agent::session::{PlaybackSession, PlaybackState};
use crate::error::MoodResult;
use crate::state::TickState;

/// Playback controls accepted while the loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCommand {
    /// Pause when playing, resume when paused.
    Toggle,
    /// Stop the current track. The loop keeps watching and picks a new one
    /// once the switch delay has passed.
    Stop,
    Quit,
}

impl LoopCommand {
    /// `p`/`pause`, `s`/`stop`, `q`/`quit`; anything else is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "p" | "pause" | "resume" => Some(LoopCommand::Toggle),
            "s" | "stop" => Some(LoopCommand::Stop),
            "q" | "quit" | "exit" => Some(LoopCommand::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopSettings {
    /// Minimum gap between two track switches.
    pub switch_delay: Duration,
    pub poll_interval: Duration,
    /// Ignore detections below the classifier threshold.
    pub enforce_confidence: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            switch_delay: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            enforce_confidence: false,
        }
    }
}

pub struct MoodLoop {
    classifier: EmotionClassifier,
    selector: PlaybackSelector,
    session: PlaybackSession,
    settings: LoopSettings,
    playing_category: Option<MoodCategory>,
    last_attempt: Option<Instant>,
}

impl MoodLoop {
    pub fn new(classifier: EmotionClassifier, selector: PlaybackSelector, settings: LoopSettings) -> Self {
        Self {
            classifier,
            selector,
            session: PlaybackSession::new(),
            settings,
            playing_category: None,
            last_attempt: None,
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn selector(&self) -> &PlaybackSelector {
        &self.selector
    }

    pub fn pause(&mut self) {
        self.selector.pause(&mut self.session);
    }

    pub fn resume(&mut self) -> MoodResult<()> {
        self.selector.resume(&mut self.session)
    }

    pub fn toggle(&mut self) -> MoodResult<()> {
        self.selector.toggle(&mut self.session)
    }

    pub fn stop(&mut self) {
        self.selector.stop(&mut self.session);
        self.playing_category = None;
    }

    /// Apply a control. Returns `false` when the loop should exit.
    pub fn apply(&mut self, command: LoopCommand) -> bool {
        match command {
            LoopCommand::Toggle => {
                if let Err(e) = self.toggle() {
                    warn!("[LOOP] Resume failed: {}", e);
                }
                true
            }
            LoopCommand::Stop => {
                self.stop();
                true
            }
            LoopCommand::Quit => false,
        }
    }

    fn should_switch(&self, category: MoodCategory, now: Instant) -> bool {
        let wants_new = match self.session.state() {
            // Paused is a user decision; never override it.
            PlaybackState::Paused => false,
            PlaybackState::Idle => true,
            PlaybackState::Playing => {
                self.playing_category != Some(category) || !self.selector.engine_playing()
            }
        };
        if !wants_new {
            return false;
        }
        match self.last_attempt {
            Some(at) => now.saturating_duration_since(at) >= self.settings.switch_delay,
            None => true,
        }
    }

    fn snapshot(&self) -> TickState {
        TickState {
            detection: self.classifier.last_detection().cloned(),
            category: None,
            playback: self.session.state(),
            track: self.session.current_track_info(),
            switched: false,
            error: None,
        }
    }

    pub async fn tick_at(&mut self, now: Instant) -> TickState {
        let detection = match self.classifier.sample_at(now).await {
            Some(d) => d,
            None => {
                let mut state = self.snapshot();
                state.detection = None;
                return state;
            }
        };

        let category = self.selector.map_to_category(detection.label);
        let mut state = self.snapshot();
        state.detection = Some(detection.clone());
        state.category = Some(category);

        if !detection.confident && self.settings.enforce_confidence {
            debug!("[LOOP] Ignoring low-confidence {}", detection.label);
            return state;
        }

        if !self.should_switch(category, now) {
            return state;
        }

        self.last_attempt = Some(now);
        let result = match self.selector.select_track(category).await {
            Ok(track) => self.selector.play(&mut self.session, track).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("[LOOP] Mood '{}' → switched track.", category);
                self.playing_category = Some(category);
                state.switched = true;
            }
            Err(e) => {
                warn!("[LOOP] Mood '{}': {}", category, e);
                // A finished track with nothing to replace it is no longer playing.
                if self.session.state() == PlaybackState::Playing && !self.selector.engine_playing() {
                    self.stop();
                }
                state.error = Some(e.to_string());
            }
        }

        state.playback = self.session.state();
        state.track = self.session.current_track_info();
        state
    }

    pub async fn tick(&mut self) -> TickState {
        self.tick_at(Instant::now()).await
    }

    /// Tick until `stop` is raised or a `Quit` arrives on `controls`, then
    /// stop playback. Controls are applied between ticks.
    pub async fn run(&mut self, stop: Arc<AtomicBool>, mut controls: mpsc::Receiver<LoopCommand>) {
        info!("[LOOP] Started (poll every {:?}).", self.settings.poll_interval);
        let mut last_line = String::new();
        let mut controls_open = true;

        while !stop.load(Ordering::Relaxed) {
            let state = self.tick().await;
            let line = state.status_line();
            if line != last_line {
                debug!("[LOOP] {}", line);
                last_line = line;
            }

            tokio::select! {
                command = controls.recv(), if controls_open => match command {
                    Some(command) => {
                        debug!("[LOOP] Control: {:?}", command);
                        if !self.apply(command) {
                            break;
                        }
                    }
                    None => controls_open = false,
                },
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        self.stop();
        info!("[LOOP] Stopped.");
    }
}
