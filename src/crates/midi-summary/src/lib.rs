//! MIDI file summary library
//!
//! Parses Standard MIDI Files with `midly` and derives the values an
//! analyzer reports: the tempo timeline in seconds, the total duration and
//! the instruments that play notes.
//!
//! ```no_run
//! use midi_summary::MidiData;
//!
//! let bytes = std::fs::read("song.mid").unwrap();
//! let data = MidiData::from_bytes(&bytes).unwrap();
//! println!("{:?} BPM, {:.2}s", data.primary_bpm(), data.end_time);
//! ```

pub mod error;
pub mod instruments;
pub mod midi;
pub mod tempo;

pub use error::{MidiError, Result};
pub use instruments::{gm_family_name, Instrument};
pub use midi::{MidiData, MidiSummary};
pub use tempo::{TempoChange, TempoMap, TickTiming, DEFAULT_MICROS_PER_BEAT};

/// Tempo reported when a file carries no set-tempo events
pub const DEFAULT_BPM: f64 = 120.0;
