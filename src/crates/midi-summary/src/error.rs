use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MidiError>;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("failed to read MIDI file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The byte stream was rejected by the SMF decoder.
    #[error("{0}")]
    Parse(#[from] midly::Error),

    #[error("header declares {declared} track(s) but only {found} could be read")]
    MissingTracks { declared: u16, found: usize },

    #[error("track {track} is truncated: no end-of-track event")]
    TruncatedTrack { track: usize },

    #[error("unsupported MIDI timing: {0}")]
    InvalidTiming(&'static str),
}
