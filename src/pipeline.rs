//! Analysis pipeline orchestration
//!
//! Samples CSV → Adapter → Episode detector → Metrics aggregator → Encoder

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::adapter::{parse_samples, parse_samples_str};
use crate::config::DetectorConfig;
use crate::detector::EpisodeDetector;
use crate::encoder::{encode_metrics, write_episodes};
use crate::error::AnalysisError;
use crate::metrics::MetricsAggregator;
use crate::types::{Episode, GazeSample, GrowBoxMetrics};

/// Result of analysing one recording
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Number of samples read
    pub sample_count: usize,
    /// Episodes in completion order
    pub episodes: Vec<Episode>,
    pub metrics: GrowBoxMetrics,
}

impl Analysis {
    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "{} samples, {} episodes, {} rescues, {} okays",
            self.sample_count,
            self.episodes.len(),
            self.metrics.rescues,
            self.metrics.okays
        )
    }
}

/// Analyse gaze-sample CSV text and return the metrics JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let metrics_json = analyze_growbox_csv(&csv_text)?;
/// ```
pub fn analyze_growbox_csv(csv_text: &str) -> Result<String, AnalysisError> {
    let analysis = GrowBoxAnalyzer::default().analyze_csv(csv_text)?;
    encode_metrics(&analysis.metrics)
}

/// Runs the detector and aggregator with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct GrowBoxAnalyzer {
    detector: EpisodeDetector,
}

impl GrowBoxAnalyzer {
    /// Create an analyzer, rejecting invalid thresholds
    pub fn new(config: DetectorConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            detector: EpisodeDetector::new(config),
        })
    }

    /// Create an analyzer from a JSON configuration document
    pub fn with_config_json(json: &str) -> Result<Self, AnalysisError> {
        Self::new(DetectorConfig::from_json(json)?)
    }

    pub fn config(&self) -> &DetectorConfig {
        self.detector.config()
    }

    /// Detect episodes and aggregate metrics over in-memory samples
    pub fn analyze(&self, samples: Vec<GazeSample>) -> Analysis {
        let sample_count = samples.len();
        let episodes = self.detector.detect(samples);
        let metrics = MetricsAggregator::aggregate(&episodes);

        let analysis = Analysis {
            sample_count,
            episodes,
            metrics,
        };
        info!("analysis complete: {}", analysis.summary());
        analysis
    }

    /// Analyse gaze-sample CSV text
    pub fn analyze_csv(&self, csv_text: &str) -> Result<Analysis, AnalysisError> {
        Ok(self.analyze(parse_samples_str(csv_text)?))
    }

    /// Read samples from `input` (`-` for stdin), then write the episodes CSV
    /// and metrics JSON.
    pub fn analyze_files(
        &self,
        input: &Path,
        episodes_out: &Path,
        metrics_out: &Path,
    ) -> Result<Analysis, AnalysisError> {
        let samples = if input.to_string_lossy() == "-" {
            parse_samples(io::stdin().lock())?
        } else {
            info!("reading samples from {}", input.display());
            parse_samples(BufReader::new(File::open(input)?))?
        };

        let analysis = self.analyze(samples);

        let mut out = BufWriter::new(File::create(episodes_out)?);
        write_episodes(&mut out, &analysis.episodes)?;
        out.flush()?;
        info!("wrote {} episodes to {}", analysis.episodes.len(), episodes_out.display());

        fs::write(metrics_out, encode_metrics(&analysis.metrics)?)?;
        info!("wrote metrics to {}", metrics_out.display());

        Ok(analysis)
    }
}
