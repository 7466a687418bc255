//! Grow-Box - dwell-episode detection and usability metrics for gaze recordings
//!
//! Grow-Box turns the gaze-sample CSV recorded during a grow-box experiment into
//! an episode table and a small metrics document through a deterministic
//! pipeline: CSV adaptation → episode detection → metric aggregation → encoding.
//!
//! ## Modules
//!
//! - **Detector**: segments samples into dwell episodes with flicker and rescue flags
//! - **Metrics**: rescues, clean selections, failed grow attempts and mean flicker

pub mod adapter;
pub mod config;
pub mod detector;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

pub use config::DetectorConfig;
pub use detector::EpisodeDetector;
pub use error::AnalysisError;
pub use metrics::MetricsAggregator;
pub use pipeline::{analyze_growbox_csv, Analysis, GrowBoxAnalyzer};
pub use types::{Episode, GazeSample, GrowBoxMetrics};

/// Grow-Box version
pub const GROWBOX_VERSION: &str = env!("CARGO_PKG_VERSION");
