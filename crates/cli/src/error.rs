//! CLI failures and their process exit codes.
//!
//! | code | meaning |
//! |---|---|
//! | 0 | success |
//! | 2 | argument parse error (reported by clap) |
//! | 10 | engine error: unknown algorithm, unusable dimensions |
//! | 11 | I/O: config file unreadable, PNG not writable |
//! | 12 | input: bad palette, color, options JSON or pointer |
//! | 13 | serialization: JSON output failed |

use pattern_engine_core::EngineError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Engine(EngineError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => e.fmt(f),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                f.write_str(msg)
            }
        }
    }
}

/// Color and palette problems come from user flags; write failures are I/O.
impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::InvalidColor(msg) | EngineError::InvalidPalette(msg) => {
                CliError::Input(msg)
            }
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let cases = [
            (CliError::Engine(EngineError::InvalidDimensions), 10),
            (CliError::Io("disk".into()), 11),
            (CliError::Input("palette".into()), 12),
            (CliError::Serialization("json".into()), 13),
        ];
        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn engine_io_maps_to_io_code() {
        let err = CliError::from(EngineError::Io("disk full".into()));
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn unknown_algorithm_maps_to_engine_code() {
        let err = CliError::from(EngineError::UnknownAlgorithm("plasma".into()));
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("plasma"));
    }

    #[test]
    fn bad_color_and_palette_are_input_errors() {
        assert_eq!(CliError::from(EngineError::InvalidColor("#zz".into())).exit_code(), 12);
        assert_eq!(CliError::from(EngineError::InvalidPalette("plaid".into())).exit_code(), 12);
    }

    #[test]
    fn json_failures_are_serialization_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        assert_eq!(CliError::from(err).exit_code(), 13);
    }
}
