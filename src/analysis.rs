//! Turns an uploaded file into the analysis result returned to clients.

use serde::Serialize;

use midi_summary::{MidiData, TempoChange, DEFAULT_BPM};

use crate::error::AnalyzeError;

/// Tempo timeline as two index-aligned sequences.
///
/// Only built from a slice of changes, so `times` and `values` always have
/// the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempoChanges {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TempoChanges {
    pub fn from_changes(changes: &[TempoChange]) -> Self {
        let (times, values) = changes.iter().map(|change| (change.time, change.bpm)).unzip();
        Self { times, values }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub tempo: f64,
    pub tempo_changes: TempoChanges,
    pub duration: f64,
    pub instruments: usize,
}

impl AnalysisResult {
    pub fn from_midi(filename: String, data: &MidiData) -> Self {
        Self {
            filename,
            tempo: data.primary_bpm().unwrap_or(DEFAULT_BPM),
            tempo_changes: TempoChanges::from_changes(&data.tempo_changes),
            duration: data.end_time,
            instruments: data.instruments.len(),
        }
    }
}

/// Accepts names ending in `.mid` or `.midi`, in any letter case
pub fn has_midi_extension(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    lower.ends_with(".mid") || lower.ends_with(".midi")
}

pub fn validate_filename(filename: &str) -> Result<(), AnalyzeError> {
    if has_midi_extension(filename) {
        Ok(())
    } else {
        Err(AnalyzeError::Validation {
            filename: filename.to_string(),
        })
    }
}

/// Validate, parse and summarize one upload
pub fn analyze(filename: String, bytes: &[u8]) -> Result<AnalysisResult, AnalyzeError> {
    validate_filename(&filename)?;
    let data = MidiData::from_bytes(bytes)?;

    log::debug!(
        "'{}': {} track(s), instruments [{}]",
        filename,
        data.track_count,
        data.instruments
            .iter()
            .map(|instrument| instrument.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(AnalysisResult::from_midi(filename, &data))
}
