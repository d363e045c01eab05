//! Error catalog and error types for the client runtime
//!
//! Every failure the runtime can surface maps to a catalog entry with a
//! stable numeric code and a message template. Templates use positional
//! `{0}`, `{1}` placeholders rendered by [`format_message`].

use std::fmt::Display;
use thiserror::Error;

/// Symbolic error kinds with stable numeric codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Ok,
    ConnectTimeout,
    SubscribeTimeout,
    UnsubscribeTimeout,
    PingTimeout,
    InternalError,
    ConnackReturnCode,
    SocketError,
    SocketClose,
    MalformedUtf,
    Unsupported,
    InvalidState,
    InvalidType,
    InvalidArgument,
}

impl ErrorKind {
    /// Numeric code reported to the connection owner
    pub const fn code(self) -> u16 {
        match self {
            ErrorKind::Ok => 0,
            ErrorKind::ConnectTimeout => 1,
            ErrorKind::SubscribeTimeout => 2,
            ErrorKind::UnsubscribeTimeout => 3,
            ErrorKind::PingTimeout => 4,
            ErrorKind::InternalError => 5,
            ErrorKind::ConnackReturnCode => 6,
            ErrorKind::SocketError => 7,
            ErrorKind::SocketClose => 8,
            ErrorKind::MalformedUtf => 9,
            ErrorKind::Unsupported => 10,
            ErrorKind::InvalidState => 11,
            ErrorKind::InvalidType => 12,
            ErrorKind::InvalidArgument => 13,
        }
    }

    /// Message template with positional placeholders
    pub const fn template(self) -> &'static str {
        match self {
            ErrorKind::Ok => "OK.",
            ErrorKind::ConnectTimeout => "Connect timed out.",
            ErrorKind::SubscribeTimeout => "Subscribe timed out.",
            ErrorKind::UnsubscribeTimeout => "Unsubscribe timed out.",
            ErrorKind::PingTimeout => "Ping timed out.",
            ErrorKind::InternalError => "Internal error. Error Message: {0}",
            ErrorKind::ConnackReturnCode => "Bad Connack return code: {0} {1}.",
            ErrorKind::SocketError => "Socket error: {0}.",
            ErrorKind::SocketClose => "Socket closed.",
            ErrorKind::MalformedUtf => "Malformed UTF data: {0}.",
            ErrorKind::Unsupported => "{0} is not supported.",
            ErrorKind::InvalidState => "Invalid state {0}.",
            ErrorKind::InvalidType => "Invalid type {0} for {1}.",
            ErrorKind::InvalidArgument => "Invalid argument {0} for {1}.",
        }
    }
}

/// Render a catalog message, substituting `{i}` with `args[i]`
///
/// Placeholders without a matching argument are left in place.
pub fn format_message(kind: ErrorKind, args: &[&dyn Display]) -> String {
    let mut rendered = kind.template().to_string();
    for (index, arg) in args.iter().enumerate() {
        rendered = rendered.replace(&format!("{{{index}}}"), &arg.to_string());
    }
    rendered
}

/// Main error type for client runtime operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    InvalidArgument {
        value: String,
        field: &'static str,
        message: String,
    },

    #[error("{message}")]
    InvalidState { message: String },

    #[error("{message}")]
    MalformedUtf { message: String },

    #[error("{}", ErrorKind::PingTimeout.template())]
    PingTimeout,

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ClientError {
    /// Create an invalid argument error for `field` carrying the offending value
    pub fn invalid_argument<V: Display>(value: V, field: &'static str) -> Self {
        let value = value.to_string();
        let message = format_message(ErrorKind::InvalidArgument, &[&value, &field]);
        Self::InvalidArgument {
            value,
            field,
            message,
        }
    }

    /// Create the qos rejection error, which uses the short message form
    pub fn invalid_qos<V: Display>(value: V) -> Self {
        let value = value.to_string();
        Self::InvalidArgument {
            message: format!("Invalid argument: {value}"),
            value,
            field: "qos",
        }
    }

    /// Create invalid state error
    pub fn invalid_state<S: Display>(state: S) -> Self {
        Self::InvalidState {
            message: format_message(ErrorKind::InvalidState, &[&state]),
        }
    }

    /// Create malformed UTF error
    pub fn malformed_utf<S: Display>(detail: S) -> Self {
        Self::MalformedUtf {
            message: format_message(ErrorKind::MalformedUtf, &[&detail]),
        }
    }

    /// Create transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Catalog entry this error reports as
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            ClientError::InvalidState { .. } => ErrorKind::InvalidState,
            ClientError::MalformedUtf { .. } => ErrorKind::MalformedUtf,
            ClientError::PingTimeout => ErrorKind::PingTimeout,
            ClientError::Transport { .. } => ErrorKind::SocketError,
            ClientError::Config(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Numeric catalog code
    pub fn code(&self) -> u16 {
        self.kind().code()
    }
}

/// Result type for client runtime operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_substitutes_positional_args() {
        let rendered = format_message(ErrorKind::InvalidArgument, &[&42, &"payload"]);
        assert_eq!(rendered, "Invalid argument 42 for payload.");
    }

    #[test]
    fn test_format_message_leaves_missing_placeholders() {
        let rendered = format_message(ErrorKind::ConnackReturnCode, &[&5]);
        assert_eq!(rendered, "Bad Connack return code: 5 {1}.");
    }

    #[test]
    fn test_format_message_without_placeholders() {
        assert_eq!(
            format_message(ErrorKind::PingTimeout, &[]),
            "Ping timed out."
        );
    }

    #[test]
    fn test_catalog_codes_are_unique() {
        let kinds = [
            ErrorKind::Ok,
            ErrorKind::ConnectTimeout,
            ErrorKind::SubscribeTimeout,
            ErrorKind::UnsubscribeTimeout,
            ErrorKind::PingTimeout,
            ErrorKind::InternalError,
            ErrorKind::ConnackReturnCode,
            ErrorKind::SocketError,
            ErrorKind::SocketClose,
            ErrorKind::MalformedUtf,
            ErrorKind::Unsupported,
            ErrorKind::InvalidState,
            ErrorKind::InvalidType,
            ErrorKind::InvalidArgument,
        ];
        let mut codes: Vec<u16> = kinds.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert_eq!(ErrorKind::PingTimeout.code(), 4);
        assert_eq!(ErrorKind::InvalidArgument.code(), 13);
    }

    #[test]
    fn test_invalid_argument_constructor() {
        let error = ClientError::invalid_argument("true", "retained");
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
        assert_eq!(error.to_string(), "Invalid argument true for retained.");
        match error {
            ClientError::InvalidArgument { value, field, .. } => {
                assert_eq!(value, "true");
                assert_eq!(field, "retained");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_qos_message() {
        let error = ClientError::invalid_qos(3);
        assert_eq!(error.to_string(), "Invalid argument: 3");
        assert_eq!(error.code(), 13);
    }

    #[test]
    fn test_ping_timeout_display_and_code() {
        let error = ClientError::PingTimeout;
        assert_eq!(error.to_string(), "Ping timed out.");
        assert_eq!(error.code(), ErrorKind::PingTimeout.code());
    }

    #[test]
    fn test_invalid_state_constructor() {
        let error = ClientError::invalid_state("destinationName not set");
        assert_eq!(error.to_string(), "Invalid state destinationName not set.");
        assert_eq!(error.code(), 11);
    }

    #[test]
    fn test_transport_error_maps_to_socket_error() {
        let error = ClientError::transport("broken pipe");
        assert_eq!(error.kind(), ErrorKind::SocketError);
        assert_eq!(error.to_string(), "Transport error: broken pipe");
    }
}
