//! Instruments found in a MIDI file and General MIDI naming.

use serde::Serialize;

/// MIDI channel reserved for percussion by General MIDI (channel 10, zero-based 9).
pub const DRUM_CHANNEL: u8 = 9;

/// A group of notes played by one program on one channel of one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instrument {
    pub track: usize,
    pub channel: u8,
    pub program: u8,
    pub is_drum: bool,
    pub name: Option<String>,
    pub note_count: usize,
}

impl Instrument {
    pub fn new(track: usize, channel: u8, program: u8, name: Option<String>) -> Self {
        Self {
            track,
            channel,
            program,
            is_drum: channel == DRUM_CHANNEL,
            name,
            note_count: 0,
        }
    }

    /// Human-readable label: the track name if present, else "Drums" or the GM family
    pub fn label(&self) -> &str {
        if let Some(name) = self.name.as_deref() {
            return name;
        }
        if self.is_drum {
            "Drums"
        } else {
            gm_family_name(self.program)
        }
    }
}

/// General MIDI instrument family for a program number
pub fn gm_family_name(program: u8) -> &'static str {
    match program {
        0..=7 => "Piano",
        8..=15 => "Chromatic Percussion",
        16..=23 => "Organ",
        24..=31 => "Guitar",
        32..=39 => "Bass",
        40..=47 => "Strings",
        48..=55 => "Ensemble",
        56..=63 => "Brass",
        64..=71 => "Reed",
        72..=79 => "Pipe",
        80..=87 => "Synth Lead",
        88..=95 => "Synth Pad",
        96..=103 => "Synth Effects",
        104..=111 => "Ethnic",
        112..=119 => "Percussive",
        120..=127 => "Sound Effects",
        _ => "Unknown",
    }
}
