//! Dwell episode detection
//!
//! Segments a time-ordered gaze stream into episodes, one per contiguous run of
//! samples on the same target. The scan is a fold over [`ScanState`]: at any
//! point there is either no open episode or exactly one [`OpenEpisode`], and a
//! boundary sample closes the open one before (possibly) opening the next.

use log::{debug, warn};

use crate::config::DetectorConfig;
use crate::types::{Episode, GazeSample};

/// Episode detector for grow-box gaze recordings
#[derive(Debug, Clone, Default)]
pub struct EpisodeDetector {
    config: DetectorConfig,
}

impl EpisodeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect episodes in `samples`, sorting them by timestamp first.
    pub fn detect(&self, mut samples: Vec<GazeSample>) -> Vec<Episode> {
        if samples
            .windows(2)
            .any(|w| w[1].timestamp < w[0].timestamp)
        {
            warn!("gaze samples are not in timestamp order; sorting");
        }
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let timestamps: Vec<f64> = samples.iter().map(|s| s.timestamp).collect();
        let samp_ms = nominal_sample_period(&timestamps);
        debug!(
            "scanning {} samples, nominal period {:.3} ms",
            samples.len(),
            samp_ms
        );

        samples
            .iter()
            .fold(ScanState::new(&self.config, samp_ms), |mut state, sample| {
                state.step(sample);
                state
            })
            .finish()
    }
}

/// Median of consecutive timestamp differences.
///
/// Expects sorted timestamps. Returns 0 for fewer than two samples.
pub fn nominal_sample_period(timestamps: &[f64]) -> f64 {
    let mut deltas: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
    if deltas.is_empty() {
        return 0.0;
    }
    deltas.sort_by(f64::total_cmp);

    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 0 {
        (deltas[mid - 1] + deltas[mid]) / 2.0
    } else {
        deltas[mid]
    }
}

/// An episode that has been opened but not yet closed
#[derive(Debug, Clone, PartialEq)]
pub struct OpenEpisode {
    pub id: String,
    pub start_ts: f64,
    pub grow_on: bool,
    pub fired: bool,
    pub flicker_frames: u32,
}

impl OpenEpisode {
    fn open(sample: &GazeSample, config: &DetectorConfig) -> Self {
        Self {
            id: sample.lasthit.clone(),
            start_ts: sample.timestamp,
            grow_on: config.is_grow_mode(&sample.mode),
            fired: false,
            flicker_frames: 0,
        }
    }

    fn update(&mut self, sample: &GazeSample, config: &DetectorConfig) {
        let elapsed = sample.timestamp - self.start_ts;
        if !self.fired && elapsed >= config.dwell_ms {
            self.fired = true;
        }
        if elapsed >= config.grow_after_ms && sample.is_borderline() {
            self.flicker_frames += 1;
        }
    }

    /// Finalize with `end_ts` as the last sample time of the run
    pub fn close(self, end_ts: f64, samp_ms: f64) -> Episode {
        let flicker_ms = f64::from(self.flicker_frames) * samp_ms;
        let saved = self.fired && self.grow_on && flicker_ms > 0.0;
        Episode {
            id: self.id,
            start_ts: self.start_ts,
            end_ts,
            duration: end_ts - self.start_ts,
            flicker_ms,
            grow_on: self.grow_on,
            fired: self.fired,
            saved,
        }
    }
}

/// Accumulator threaded through the sample scan
#[derive(Debug, Clone)]
pub struct ScanState<'a> {
    config: &'a DetectorConfig,
    samp_ms: f64,
    open: Option<OpenEpisode>,
    prev_ts: Option<f64>,
    closed: Vec<Episode>,
}

impl<'a> ScanState<'a> {
    pub fn new(config: &'a DetectorConfig, samp_ms: f64) -> Self {
        Self {
            config,
            samp_ms,
            open: None,
            prev_ts: None,
            closed: Vec::new(),
        }
    }

    /// The episode currently in progress, if any
    pub fn open_episode(&self) -> Option<&OpenEpisode> {
        self.open.as_ref()
    }

    /// Episodes closed so far
    pub fn closed(&self) -> &[Episode] {
        &self.closed
    }

    /// Advance the scan by one sample
    pub fn step(&mut self, sample: &GazeSample) {
        let continues = !sample.lasthit.is_empty()
            && self
                .open
                .as_ref()
                .is_some_and(|open| open.id == sample.lasthit);

        if !continues {
            self.close_open();
            if !sample.lasthit.is_empty() {
                self.open = Some(OpenEpisode::open(sample, self.config));
            }
        }

        if let Some(open) = self.open.as_mut() {
            open.update(sample, self.config);
        }
        self.prev_ts = Some(sample.timestamp);
    }

    /// Close any trailing episode and return every episode in completion order
    pub fn finish(mut self) -> Vec<Episode> {
        self.close_open();
        self.closed
    }

    fn close_open(&mut self) {
        if let Some(open) = self.open.take() {
            // An open episode implies at least one sample has been seen.
            let end_ts = self.prev_ts.unwrap_or(open.start_ts);
            let episode = open.close(end_ts, self.samp_ms);
            debug!(
                "episode {} [{}, {}] fired={} flicker_ms={} saved={}",
                episode.id,
                episode.start_ts,
                episode.end_ts,
                episode.fired,
                episode.flicker_ms,
                episode.saved
            );
            self.closed.push(episode);
        }
    }
}
