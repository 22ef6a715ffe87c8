// MOODTUNE Emotion Vocabulary & Mood Table
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// The closed set of recognizer labels, the coarser mood categories that
// drive playback, and the static genre table keyed by mood.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw output class from the face/emotion recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Fear,
    Surprise,
    Disgust,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Fear,
        EmotionLabel::Surprise,
        EmotionLabel::Disgust,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// Static label → mood table.
    pub fn category(&self) -> MoodCategory {
        match self {
            EmotionLabel::Happy => MoodCategory::Happy,
            EmotionLabel::Sad => MoodCategory::Sad,
            EmotionLabel::Angry => MoodCategory::Energetic,
            EmotionLabel::Fear => MoodCategory::Calm,
            EmotionLabel::Surprise => MoodCategory::Energetic,
            EmotionLabel::Disgust => MoodCategory::Energetic,
            EmotionLabel::Neutral => MoodCategory::Neutral,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown emotion label '{0}'")]
pub struct UnknownEmotion(pub String);

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    /// Case-insensitive; also accepts the noun/adjective forms some
    /// recognizers emit ("happiness", "fearful", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" | "happiness" => Ok(EmotionLabel::Happy),
            "sad" | "sadness" => Ok(EmotionLabel::Sad),
            "angry" | "anger" => Ok(EmotionLabel::Angry),
            "fear" | "fearful" => Ok(EmotionLabel::Fear),
            "surprise" | "surprised" => Ok(EmotionLabel::Surprise),
            "disgust" | "disgusted" => Ok(EmotionLabel::Disgust),
            "neutral" => Ok(EmotionLabel::Neutral),
            _ => Err(UnknownEmotion(s.to_string())),
        }
    }
}

/// Playback-relevant grouping derived from an [`EmotionLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Sad,
    Energetic,
    Calm,
    Neutral,
}

impl MoodCategory {
    pub const ALL: [MoodCategory; 5] = [
        MoodCategory::Happy,
        MoodCategory::Sad,
        MoodCategory::Energetic,
        MoodCategory::Calm,
        MoodCategory::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodCategory::Happy => "happy",
            MoodCategory::Sad => "sad",
            MoodCategory::Energetic => "energetic",
            MoodCategory::Calm => "calm",
            MoodCategory::Neutral => "neutral",
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total mapping from a raw label name to a mood. Anything outside the
/// known seven labels lands on `Neutral`.
pub fn map_to_category(label: &str) -> MoodCategory {
    label
        .parse::<EmotionLabel>()
        .map(|l| l.category())
        .unwrap_or(MoodCategory::Neutral)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyTier {
    Low,
    Medium,
    High,
}

/// Genre tags, descriptor and energy for one mood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub genres: Vec<String>,
    pub mood: String,
    pub energy: EnergyTier,
}

impl GenreProfile {
    fn new(genres: &[&str], mood: &str, energy: EnergyTier) -> Self {
        Self {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            mood: mood.to_string(),
            energy,
        }
    }
}

pub type GenreTable = BTreeMap<MoodCategory, GenreProfile>;

/// Built-in genre table used when the config file does not override it.
pub fn default_genre_table() -> GenreTable {
    let mut table = BTreeMap::new();
    table.insert(
        MoodCategory::Happy,
        GenreProfile::new(&["pop", "dance", "disco"], "upbeat", EnergyTier::High),
    );
    table.insert(
        MoodCategory::Sad,
        GenreProfile::new(&["indie", "acoustic", "piano"], "melancholic", EnergyTier::Low),
    );
    table.insert(
        MoodCategory::Energetic,
        GenreProfile::new(
            &["rock", "metal", "punk", "electronic", "industrial"],
            "intense",
            EnergyTier::High,
        ),
    );
    table.insert(
        MoodCategory::Calm,
        GenreProfile::new(&["ambient", "dark ambient"], "tense", EnergyTier::Low),
    );
    table.insert(
        MoodCategory::Neutral,
        GenreProfile::new(&["ambient", "classical", "jazz"], "calm", EnergyTier::Medium),
    );
    table
}
