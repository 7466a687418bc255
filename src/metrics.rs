//! Grow-box usability metrics
//!
//! Reduces an episode sequence to four scalar aggregates in one pass.

use crate::types::{Episode, GrowBoxMetrics};

/// Aggregator for episode-level metrics
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Aggregate metrics over the full episode sequence
    pub fn aggregate(episodes: &[Episode]) -> GrowBoxMetrics {
        let totals = episodes
            .iter()
            .fold(PartialSums::default(), |acc, episode| acc.add(episode));

        GrowBoxMetrics {
            rescues: totals.rescues,
            okays: totals.okays,
            avg_unsaved_grow_ms: mean(totals.unsaved_grow_duration, totals.unsaved_grow).trunc()
                as i64,
            mean_flicker_ms: round_to_tenth(mean(totals.rescue_flicker_ms, totals.rescues)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PartialSums {
    rescues: u32,
    rescue_flicker_ms: f64,
    okays: u32,
    unsaved_grow: u32,
    unsaved_grow_duration: f64,
}

impl PartialSums {
    fn add(mut self, episode: &Episode) -> Self {
        if episode.saved {
            self.rescues += 1;
            self.rescue_flicker_ms += episode.flicker_ms;
        }
        if episode.fired && episode.flicker_ms == 0.0 {
            self.okays += 1;
        }
        if episode.grow_on && !episode.fired {
            self.unsaved_grow += 1;
            self.unsaved_grow_duration += episode.duration;
        }
        self
    }
}

/// Mean of `count` values summing to `sum`; 0 when there are none
fn mean(sum: f64, count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum / f64::from(count)
}

/// Round to one decimal, ties to even on the exact binary value.
///
/// `value * 10.0` can itself round onto a .5 (0.15 becomes 1.5), so the fused
/// residual decides which side of the midpoint the true product lies on.
fn round_to_tenth(value: f64) -> f64 {
    let scaled = value * 10.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor == 0.5 {
        let residual = value.mul_add(10.0, -scaled);
        if residual < 0.0 {
            floor
        } else if residual > 0.0 {
            floor + 1.0
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    rounded / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn episode(duration: f64, flicker_ms: f64, grow_on: bool, fired: bool) -> Episode {
        Episode {
            id: "t".to_string(),
            start_ts: 0.0,
            end_ts: duration,
            duration,
            flicker_ms,
            grow_on,
            fired,
            saved: fired && grow_on && flicker_ms > 0.0,
        }
    }

    #[test]
    fn test_empty_episodes() {
        assert_eq!(
            MetricsAggregator::aggregate(&[]),
            GrowBoxMetrics {
                rescues: 0,
                okays: 0,
                avg_unsaved_grow_ms: 0,
                mean_flicker_ms: 0.0,
            }
        );
    }

    #[test]
    fn test_mixed_episodes() {
        let episodes = vec![
            // rescues
            episode(900.0, 33.3, true, true),
            episode(1000.0, 16.7, true, true),
            // okays
            episode(850.0, 0.0, true, true),
            episode(820.0, 0.0, false, true),
            // fired with flicker but grow off: neither
            episode(900.0, 50.0, false, true),
            // unsaved grow attempts
            episode(300.0, 10.0, true, false),
            episode(401.0, 0.0, true, false),
            // not grow, not fired: ignored
            episode(100.0, 0.0, false, false),
        ];

        let metrics = MetricsAggregator::aggregate(&episodes);
        assert_eq!(metrics.rescues, 2);
        assert_eq!(metrics.okays, 2);
        // (300 + 401) / 2 = 350.5, truncated
        assert_eq!(metrics.avg_unsaved_grow_ms, 350);
        assert_eq!(metrics.mean_flicker_ms, 25.0);
    }

    #[test]
    fn test_mean_flicker_rounds_to_one_decimal() {
        let episodes = vec![
            episode(900.0, 16.66, true, true),
            episode(900.0, 16.68, true, true),
            episode(900.0, 16.7, true, true),
        ];
        let metrics = MetricsAggregator::aggregate(&episodes);
        assert_eq!(metrics.mean_flicker_ms, 16.7);
    }

    #[test]
    fn test_mean_flicker_ties_round_to_even() {
        let episodes = vec![episode(900.0, 16.25, true, true)];
        let metrics = MetricsAggregator::aggregate(&episodes);
        assert_eq!(metrics.mean_flicker_ms, 16.2);

        assert_eq!(round_to_tenth(16.25), 16.2);
        assert_eq!(round_to_tenth(0.25), 0.2);
        assert_eq!(round_to_tenth(0.75), 0.8);
        // Not exact ties once stored in binary.
        assert_eq!(round_to_tenth(0.15), 0.1);
        assert_eq!(round_to_tenth(0.35), 0.3);
        assert_eq!(round_to_tenth(16.35), 16.4);
        assert_eq!(round_to_tenth(2.45), 2.5);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    #[test]
    fn test_no_unsaved_grow_episodes() {
        let episodes = vec![episode(100.0, 0.0, false, false)];
        let metrics = MetricsAggregator::aggregate(&episodes);
        assert_eq!(metrics.avg_unsaved_grow_ms, 0);
        assert_eq!(metrics.mean_flicker_ms, 0.0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let episodes = vec![
            episode(900.0, 20.0, true, true),
            episode(250.0, 0.0, true, false),
        ];
        let first = MetricsAggregator::aggregate(&episodes);
        let second = MetricsAggregator::aggregate(&episodes);
        assert_eq!(first, second);
        assert_eq!(episodes[0].duration, 900.0);
    }
}
