// MOODTUNE Emotion Classifier Adapter
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Turns camera frames into a single (label, confidence) pair. The model is
// only consulted once per detection interval; in between, the last good
// detection is replayed.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::agent::camera::FrameSource;
use crate::agent::emotion::EmotionLabel;
use crate::agent::recognizer::{EmotionRecognizer, FaceEmotions};
use crate::error::{MoodError, MoodResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub label: EmotionLabel,
    /// Clamped to 0.0–1.0.
    pub confidence: f32,
    /// Whether `confidence` reached the configured threshold. Advisory only.
    pub confident: bool,
}

impl Detection {
    pub fn new(label: EmotionLabel, confidence: f32, threshold: f32) -> Self {
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        Self {
            label,
            confidence,
            confident: confidence >= threshold,
        }
    }
}

/// Highest-scoring known label across all faces. Ties keep the first
/// maximum in iteration order; NaN scores never win.
///
/// Unknown labels are dropped before the maximum is taken, so an unknown
/// top label yields the best known one rather than a neutral fallback.
pub fn best_candidate(faces: &[FaceEmotions]) -> Option<(EmotionLabel, f32)> {
    let mut best: Option<(EmotionLabel, f32)> = None;
    for face in faces {
        for (name, score) in &face.scores {
            if score.is_nan() {
                continue;
            }
            let label = match name.parse::<EmotionLabel>() {
                Ok(l) => l,
                Err(_) => {
                    debug!("[SENSOR] Ignoring unknown label '{}'", name);
                    continue;
                }
            };
            match best {
                Some((_, top)) if *score <= top => {}
                _ => best = Some((label, *score)),
            }
        }
    }
    best
}

pub struct EmotionClassifier {
    camera: Box<dyn FrameSource>,
    recognizer: Box<dyn EmotionRecognizer>,
    interval: Duration,
    threshold: f32,
    last_classified: Option<Instant>,
    cached: Option<Detection>,
}

impl EmotionClassifier {
    pub fn new(
        camera: Box<dyn FrameSource>,
        recognizer: Box<dyn EmotionRecognizer>,
        interval: Duration,
        threshold: f32,
    ) -> Self {
        Self {
            camera,
            recognizer,
            interval,
            threshold,
            last_classified: None,
            cached: None,
        }
    }

    pub fn last_detection(&self) -> Option<&Detection> {
        self.cached.as_ref()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Strict variant: every failure kind is reported.
    ///
    /// Within the interval the cached detection is returned as `Ok` without
    /// invoking the recognizer.
    pub async fn try_sample_at(&mut self, now: Instant) -> MoodResult<Detection> {
        let frame = self.camera.read_frame().ok_or(MoodError::NoFrame)?;

        if let (Some(at), Some(cached)) = (self.last_classified, &self.cached) {
            if now.saturating_duration_since(at) < self.interval {
                return Ok(cached.clone());
            }
        }

        let faces = self.recognizer.detect(&frame).await?;
        let (label, score) = best_candidate(&faces).ok_or(MoodError::NoDetection)?;

        let detection = Detection::new(label, score, self.threshold);
        if self.cached.as_ref().map(|c| c.label) != Some(label) {
            info!(
                "[SENSOR] Emotion: {} ({:.0}%{})",
                label,
                detection.confidence * 100.0,
                if detection.confident { "" } else { ", low confidence" }
            );
        }
        self.cached = Some(detection.clone());
        self.last_classified = Some(now);
        Ok(detection)
    }

    /// Permissive variant used by the loop. No frame yields `None`; a
    /// missing face or a recognizer failure keeps the previous detection.
    pub async fn sample_at(&mut self, now: Instant) -> Option<Detection> {
        match self.try_sample_at(now).await {
            Ok(detection) => Some(detection),
            Err(MoodError::NoFrame) => None,
            Err(MoodError::NoDetection) => {
                debug!("[SENSOR] No face this round, keeping last emotion.");
                self.cached.clone()
            }
            Err(e) => {
                warn!("[SENSOR] {}", e);
                self.cached.clone()
            }
        }
    }

    pub async fn sample(&mut self) -> Option<Detection> {
        self.sample_at(Instant::now()).await
    }
}
