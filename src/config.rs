use std::net::{IpAddr, SocketAddr};

use clap::Parser;

/// Uploads above this size are refused by the body-limit layer
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "midi-analyzer")]
#[command(about = "Serve tempo, duration and instrument analysis of uploaded MIDI files", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "MIDI_ANALYZER_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, env = "MIDI_ANALYZER_PORT", default_value = "8000")]
    pub port: u16,

    /// Largest accepted request body in bytes; larger uploads get 413
    #[arg(long, env = "MIDI_ANALYZER_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let parsed = ServerConfig::try_parse_from(["midi-analyzer"]).unwrap();
        let default = ServerConfig::default();
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.max_upload_bytes, default.max_upload_bytes);
    }

    #[test]
    fn test_cli_overrides() {
        let config = ServerConfig::try_parse_from([
            "midi-analyzer",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--max-upload-bytes",
            "2048",
        ])
        .unwrap();
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.max_upload_bytes, 2048);
    }
}
