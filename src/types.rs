//! Core types for the grow-box analysis pipeline
//!
//! Samples flow in from the recorded CSV, episodes are derived from them, and
//! metrics summarise the episodes.

use serde::{Deserialize, Serialize, Serializer};

/// One gaze sample as recorded by the experiment page
#[derive(Debug, Clone, PartialEq)]
pub struct GazeSample {
    /// Sample time in milliseconds
    pub timestamp: f64,
    /// Target under gaze; empty when gaze is on no target
    pub lasthit: String,
    /// Active UI state string
    pub mode: String,
    /// Sample falls inside the grown hit region; `None` when not recorded
    pub hit_grow: Option<bool>,
    /// Sample falls inside the exact (un-grown) hit region; `None` when not recorded
    pub hit_exact: Option<bool>,
}

impl GazeSample {
    pub fn new(timestamp: f64, lasthit: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            timestamp,
            lasthit: lasthit.into(),
            mode: mode.into(),
            hit_grow: None,
            hit_exact: None,
        }
    }

    /// Set both hit-test flags as recorded
    pub fn with_hits(mut self, hit_grow: bool, hit_exact: bool) -> Self {
        self.hit_grow = Some(hit_grow);
        self.hit_exact = Some(hit_exact);
        self
    }

    /// Held only by the grown region, not the real target.
    ///
    /// A sample with either flag missing is never borderline.
    pub fn is_borderline(&self) -> bool {
        self.hit_grow == Some(true) && self.hit_exact == Some(false)
    }
}

/// A closed dwell episode over one target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    /// Target id
    pub id: String,
    /// Timestamp of the first sample in the run
    #[serde(rename = "startTS", serialize_with = "serialize_ms")]
    pub start_ts: f64,
    /// Timestamp of the last sample in the run
    #[serde(rename = "endTS", serialize_with = "serialize_ms")]
    pub end_ts: f64,
    /// `end_ts - start_ts`
    #[serde(serialize_with = "serialize_ms")]
    pub duration: f64,
    /// Flicker frames converted to milliseconds via the nominal sample period
    #[serde(serialize_with = "serialize_ms")]
    pub flicker_ms: f64,
    /// Grow mode was active when the episode opened
    pub grow_on: bool,
    /// Dwell threshold was reached
    pub fired: bool,
    /// Selection was rescued by the grow box
    pub saved: bool,
}

/// Usability metrics over a full episode sequence
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GrowBoxMetrics {
    /// Episodes saved by the grow box
    pub rescues: u32,
    /// Episodes that fired without any flicker
    pub okays: u32,
    /// Mean duration of grow-mode episodes that never fired
    pub avg_unsaved_grow_ms: i64,
    /// Mean flicker duration over rescued episodes, one decimal
    pub mean_flicker_ms: f64,
}

/// Write whole milliseconds without a fractional part.
fn serialize_ms<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
