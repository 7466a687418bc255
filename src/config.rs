//! Detector configuration
//!
//! Thresholds mirror the constants used by the grow-box experiment page, so a
//! default configuration reproduces the behaviour participants saw.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Dwell threshold (ms) after which a target is selected
pub const DWELL_MS: f64 = 800.0;

/// Delay (ms) before the grow box starts expanding
pub const GROW_AFTER_MS: f64 = 120.0;

/// Substring of `mode` that marks grow mode as enabled
pub const GROW_MARKER: &str = "g";

/// Thresholds used by the episode detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Elapsed time within an episode at which dwell fires
    pub dwell_ms: f64,
    /// Elapsed time within an episode before grow-only hits count as flicker
    pub grow_after_ms: f64,
    /// Marker searched for in the `mode` column
    pub grow_marker: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            dwell_ms: DWELL_MS,
            grow_after_ms: GROW_AFTER_MS,
            grow_marker: GROW_MARKER.to_string(),
        }
    }
}

impl DetectorConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject thresholds the detector cannot interpret
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.dwell_ms.is_finite() || self.dwell_ms < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "dwell_ms must be a non-negative number, got {}",
                self.dwell_ms
            )));
        }
        if !self.grow_after_ms.is_finite() || self.grow_after_ms < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "grow_after_ms must be a non-negative number, got {}",
                self.grow_after_ms
            )));
        }
        if self.grow_marker.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "grow_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a `mode` string has grow mode enabled
    pub fn is_grow_mode(&self, mode: &str) -> bool {
        mode.contains(self.grow_marker.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_experiment_constants() {
        let config = DetectorConfig::default();
        assert_eq!(config.dwell_ms, 800.0);
        assert_eq!(config.grow_after_ms, 120.0);
        assert_eq!(config.grow_marker, "g");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DetectorConfig::from_json(r#"{"dwell_ms": 500}"#).unwrap();
        assert_eq!(config.dwell_ms, 500.0);
        assert_eq!(config.grow_after_ms, GROW_AFTER_MS);
        assert_eq!(config.grow_marker, GROW_MARKER);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DetectorConfig {
            dwell_ms: 650.0,
            grow_after_ms: 90.0,
            grow_marker: "grow".to_string(),
        };
        let json = config.to_json().unwrap();
        assert_eq!(DetectorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_negative_thresholds() {
        let config = DetectorConfig {
            dwell_ms: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));

        let config = DetectorConfig {
            grow_after_ms: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_marker() {
        let result = DetectorConfig::from_json(r#"{"grow_marker": ""}"#);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_grow_mode_is_substring_match() {
        let config = DetectorConfig::default();
        assert!(config.is_grow_mode("g"));
        assert!(config.is_grow_mode("dwell+g"));
        assert!(!config.is_grow_mode("d"));
        assert!(!config.is_grow_mode(""));
    }
}
