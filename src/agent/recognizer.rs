// MOODTUNE Emotion Recognizer Bridge
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// The face/emotion model lives outside this process. HttpRecognizer
// PNG-encodes a frame and posts it to a recognition service that answers
// with one label→score map per detected face.

use async_trait::async_trait;
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

use crate::agent::camera::Frame;
use crate::error::{MoodError, MoodResult};

/// Scores for one detected face, in the order the recognizer reported them.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceEmotions {
    pub scores: Vec<(String, f32)>,
}

impl FaceEmotions {
    pub fn new<S: Into<String>>(scores: Vec<(S, f32)>) -> Self {
        Self {
            scores: scores.into_iter().map(|(l, s)| (l.into(), s)).collect(),
        }
    }
}

#[async_trait]
pub trait EmotionRecognizer: Send + Sync {
    /// Zero or more faces found in `frame`.
    async fn detect(&self, frame: &Frame) -> MoodResult<Vec<FaceEmotions>>;
}

#[derive(Debug, Deserialize)]
struct FaceResponse {
    emotions: serde_json::Map<String, serde_json::Value>,
}

/// Parse `[{"emotions": {"happy": 0.9, ...}}, ...]`. Non-numeric scores are skipped.
pub fn parse_faces(body: &str) -> MoodResult<Vec<FaceEmotions>> {
    let faces: Vec<FaceResponse> = serde_json::from_str(body)
        .map_err(|e| MoodError::Recognizer(format!("bad recognizer response: {}", e)))?;

    Ok(faces
        .into_iter()
        .map(|face| FaceEmotions {
            scores: face
                .emotions
                .into_iter()
                .filter_map(|(label, v)| v.as_f64().map(|s| (label, s as f32)))
                .collect(),
        })
        .collect())
}

pub struct HttpRecognizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRecognizer {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn encode_png(frame: &Frame) -> MoodResult<Vec<u8>> {
    let img = image::RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| {
            MoodError::Recognizer(format!(
                "frame buffer does not match {}x{}",
                frame.width, frame.height
            ))
        })?;

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageOutputFormat::Png)
        .map_err(|e| MoodError::Recognizer(format!("PNG encode failed: {}", e)))?;
    Ok(png.into_inner())
}

#[async_trait]
impl EmotionRecognizer for HttpRecognizer {
    async fn detect(&self, frame: &Frame) -> MoodResult<Vec<FaceEmotions>> {
        let png = encode_png(frame)?;
        debug!("[SENSOR] Posting {} byte frame to {}", png.len(), self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await
            .map_err(|e| MoodError::Recognizer(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MoodError::Recognizer(format!(
                "recognizer returned {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| MoodError::Recognizer(e.to_string()))?;
        parse_faces(&body)
    }
}
