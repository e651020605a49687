use std::collections::HashMap;
use std::path::Path;

use midly::{Format, MetaMessage, MidiMessage, Smf, TrackEventKind};
use serde::Serialize;

use crate::error::{MidiError, Result};
use crate::instruments::Instrument;
use crate::tempo::{TempoChange, TempoMap, TickTiming};

/// Everything the analyzer needs from a Standard MIDI File, detached from the
/// source bytes.
#[derive(Debug, Clone)]
pub struct MidiData {
    pub format: Format,
    pub timing: TickTiming,
    pub track_count: usize,
    pub tempo_changes: Vec<TempoChange>,
    /// Seconds until the latest event across all tracks
    pub end_time: f64,
    pub instruments: Vec<Instrument>,
}

impl MidiData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| MidiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;
        Self::check_complete(data, &smf)?;
        let timing = TickTiming::from_header(smf.header.timing)?;

        let tempo_map = TempoMap::new(timing, Self::collect_tempo_events(&smf));
        let end_time = tempo_map.seconds_at(Self::last_tick(&smf));
        let instruments = Self::collect_instruments(&smf);

        Ok(MidiData {
            format: smf.header.format,
            timing,
            track_count: smf.tracks.len(),
            tempo_changes: tempo_map.changes(),
            end_time,
            instruments,
        })
    }

    /// First tempo on the timeline, if the file sets one
    pub fn primary_bpm(&self) -> Option<f64> {
        self.tempo_changes.first().map(|change| change.bpm)
    }

    // A stream cut inside a track chunk can still decode as a shorter file
    fn check_complete(data: &[u8], smf: &Smf) -> Result<()> {
        if let Some(declared) = declared_track_count(data) {
            if smf.tracks.len() < declared as usize {
                return Err(MidiError::MissingTracks {
                    declared,
                    found: smf.tracks.len(),
                });
            }
        }

        for (track, events) in smf.tracks.iter().enumerate() {
            let ended = matches!(
                events.last().map(|event| event.kind),
                Some(TrackEventKind::Meta(MetaMessage::EndOfTrack))
            );
            if !ended {
                return Err(MidiError::TruncatedTrack { track });
            }
        }
        Ok(())
    }

    fn collect_tempo_events(smf: &Smf) -> Vec<(u64, u32)> {
        let mut events = Vec::new();
        for track in &smf.tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta.as_int() as u64;
                if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                    events.push((tick, tempo.as_int()));
                }
            }
        }
        events
    }

    fn last_tick(smf: &Smf) -> u64 {
        smf.tracks
            .iter()
            .map(|track| track.iter().map(|event| event.delta.as_int() as u64).sum::<u64>())
            .max()
            .unwrap_or(0)
    }

    fn collect_instruments(smf: &Smf) -> Vec<Instrument> {
        let mut instruments: Vec<Instrument> = Vec::new();

        for (track_idx, track) in smf.tracks.iter().enumerate() {
            let track_name = track.iter().find_map(|event| match event.kind {
                TrackEventKind::Meta(MetaMessage::TrackName(name)) => clean_track_name(name),
                _ => None,
            });

            // Program in effect per channel; resets with every track
            let mut programs = [0u8; 16];
            // (channel, program) -> index into `instruments`
            let mut slots: HashMap<(u8, u8), usize> = HashMap::new();

            for event in track {
                let TrackEventKind::Midi { channel, message } = event.kind else {
                    continue;
                };
                let channel = channel.as_int();

                match message {
                    MidiMessage::ProgramChange { program } => {
                        programs[channel as usize] = program.as_int();
                    }
                    // A note-on with velocity 0 is a note-off
                    MidiMessage::NoteOn { vel, .. } if vel.as_int() > 0 => {
                        let program = programs[channel as usize];
                        let slot = *slots.entry((channel, program)).or_insert_with(|| {
                            instruments.push(Instrument::new(
                                track_idx,
                                channel,
                                program,
                                track_name.clone(),
                            ));
                            instruments.len() - 1
                        });
                        instruments[slot].note_count += 1;
                    }
                    _ => {}
                }
            }
        }

        instruments
    }
}

/// Track count from a bare `MThd` header (RIFF-wrapped files are skipped)
fn declared_track_count(data: &[u8]) -> Option<u16> {
    if !data.starts_with(b"MThd") {
        return None;
    }
    let bytes = data.get(10..12)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn clean_track_name(raw: &[u8]) -> Option<String> {
    let name = String::from_utf8_lossy(raw);
    let cleaned = name.trim_end_matches('\0').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Serializable view used by the CLI
#[derive(Debug, Serialize)]
pub struct MidiSummary<'a> {
    pub format: u8,
    pub track_count: usize,
    pub tempo: Option<f64>,
    pub tempo_changes: &'a [TempoChange],
    pub duration: f64,
    pub instruments: Vec<InstrumentSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct InstrumentSummary<'a> {
    #[serde(flatten)]
    pub instrument: &'a Instrument,
    pub label: &'a str,
    pub family: &'static str,
}

impl MidiData {
    pub fn summary(&self) -> MidiSummary<'_> {
        MidiSummary {
            format: match self.format {
                Format::SingleTrack => 0,
                Format::Parallel => 1,
                Format::Sequential => 2,
            },
            track_count: self.track_count,
            tempo: self.primary_bpm(),
            tempo_changes: &self.tempo_changes,
            duration: self.end_time,
            instruments: self
                .instruments
                .iter()
                .map(|instrument| InstrumentSummary {
                    instrument,
                    label: instrument.label(),
                    family: if instrument.is_drum {
                        "Percussion"
                    } else {
                        crate::instruments::gm_family_name(instrument.program)
                    },
                })
                .collect(),
        }
    }
}
