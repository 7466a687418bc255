//! Output encoding
//!
//! Episodes are written as CSV and metrics as a pretty-printed JSON document.

use std::io::Write;

use crate::error::AnalysisError;
use crate::types::{Episode, GrowBoxMetrics};

/// Header of the episodes table
pub const EPISODE_COLUMNS: [&str; 8] = [
    "id",
    "startTS",
    "endTS",
    "duration",
    "flicker_ms",
    "grow_on",
    "fired",
    "saved",
];

/// Write episodes as CSV. The header is written even when there are no episodes.
pub fn write_episodes<W: Write>(writer: W, episodes: &[Episode]) -> Result<(), AnalysisError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(EPISODE_COLUMNS)?;
    for episode in episodes {
        writer.serialize(episode)?;
    }
    writer.flush()?;
    Ok(())
}

/// Encode episodes to a CSV string
pub fn episodes_to_csv(episodes: &[Episode]) -> Result<String, AnalysisError> {
    let mut buffer = Vec::new();
    write_episodes(&mut buffer, episodes)?;
    String::from_utf8(buffer).map_err(|e| {
        AnalysisError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Encode metrics as pretty JSON
pub fn encode_metrics(metrics: &GrowBoxMetrics) -> Result<String, AnalysisError> {
    Ok(serde_json::to_string_pretty(metrics)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_episodes_have_header() {
        let csv = episodes_to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "id,startTS,endTS,duration,flicker_ms,grow_on,fired,saved\n"
        );
    }

    #[test]
    fn test_episode_rows() {
        let episodes = vec![
            Episode {
                id: "btn1".to_string(),
                start_ts: 0.0,
                end_ts: 900.0,
                duration: 900.0,
                flicker_ms: 450.0,
                grow_on: true,
                fired: true,
                saved: true,
            },
            Episode {
                id: "btn2".to_string(),
                start_ts: 916.5,
                end_ts: 1000.0,
                duration: 83.5,
                flicker_ms: 0.0,
                grow_on: false,
                fired: false,
                saved: false,
            },
        ];
        let csv = episodes_to_csv(&episodes).unwrap();
        assert_eq!(
            csv,
            "id,startTS,endTS,duration,flicker_ms,grow_on,fired,saved\n\
             btn1,0,900,900,450,true,true,true\n\
             btn2,916.5,1000,83.5,0,false,false,false\n"
        );
    }

    #[test]
    fn test_metrics_document_has_exactly_four_fields() {
        let metrics = GrowBoxMetrics {
            rescues: 3,
            okays: 5,
            avg_unsaved_grow_ms: 412,
            mean_flicker_ms: 33.3,
        };
        let json = encode_metrics(&metrics).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(value["rescues"], 3);
        assert_eq!(value["okays"], 5);
        assert_eq!(value["avg_unsaved_grow_ms"], 412);
        assert_eq!(value["mean_flicker_ms"], 33.3);
    }
}
