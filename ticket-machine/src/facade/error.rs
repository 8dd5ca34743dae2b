//! Facade error types.

use crate::domain::MachineId;

/// Errors from fetching configuration from the remote service.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check TICKET_MACHINE_URL credentials")]
    Unauthorized,

    /// The service has no configuration for this machine
    #[error("no configuration for machine {0}")]
    UnknownMachine(MachineId),

    /// Reading a local configuration file failed
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    /// Service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response parsed but did not describe a valid configuration
    #[error("invalid configuration: {0}")]
    Conversion(#[from] super::convert::ConversionError),
}

/// Errors from encoding or decoding a ticket.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Encoded ticket is not valid base64
    #[error("ticket is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Encoded ticket is not a valid ticket envelope
    #[error("malformed ticket: {message}")]
    Malformed { message: String },

    /// Ticket fields decode but break a ticket invariant
    #[error("invalid ticket: {0}")]
    Invalid(#[from] crate::domain::DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FacadeError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = FacadeError::UnknownMachine(MachineId::parse("tm-17").unwrap());
        assert_eq!(err.to_string(), "no configuration for machine tm-17");

        let err = FacadeError::Io {
            path: "data/mock_config.json".into(),
            message: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "I/O error reading data/mock_config.json: No such file or directory"
        );

        let err = CodecError::Malformed {
            message: "expected value".into(),
        };
        assert_eq!(err.to_string(), "malformed ticket: expected value");
    }
}
