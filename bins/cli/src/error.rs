use std::fmt;
use supaconf_shared::{ErrorCode, ErrorEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Internal = 1,
    InvalidInput = 2,
    Io = 3,
    Remote = 4,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug)]
pub enum CliError {
    InvalidInput(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Envelope(ErrorEnvelope),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::Io(_) => ExitCode::Io,
            Self::Serialization(_) => ExitCode::Internal,
            Self::Envelope(error) => envelope_exit_code(error),
        }
    }
}

/// Exit code for an engine error, keyed on its namespace.
pub fn envelope_exit_code(error: &ErrorEnvelope) -> ExitCode {
    if error.code == ErrorCode::io() || error.code == ErrorCode::not_found() {
        return ExitCode::Io;
    }
    match error.code.namespace() {
        "config" => ExitCode::InvalidInput,
        "remote" | "management" | "jwks" => ExitCode::Remote,
        _ if error.code == ErrorCode::invalid_input() => ExitCode::InvalidInput,
        _ => ExitCode::Internal,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(formatter, "invalid input: {message}"),
            Self::Io(error) => write!(formatter, "io error: {error}"),
            Self::Serialization(error) => write!(formatter, "serialization error: {error}"),
            Self::Envelope(error) => write!(formatter, "{}: {}", error.code, error.message),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error)
    }
}

impl From<ErrorEnvelope> for CliError {
    fn from(error: ErrorEnvelope) -> Self {
        Self::Envelope(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supaconf_shared::remote_write_failed;

    #[test]
    fn engine_errors_map_to_exit_codes() {
        let config = ErrorEnvelope::expected(ErrorCode::new("config", "invalid_enum"), "bad");
        assert_eq!(CliError::from(config).exit_code(), ExitCode::InvalidInput);

        let remote = remote_write_failed("auth", Some(500), "{}");
        assert_eq!(CliError::from(remote).exit_code(), ExitCode::Remote);

        let missing = ErrorEnvelope::expected(ErrorCode::not_found(), "gone");
        assert_eq!(CliError::from(missing).exit_code(), ExitCode::Io);
    }
}
