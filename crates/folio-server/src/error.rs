//! Server error types.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured bind address does not parse.
    #[error("invalid bind address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A route pattern is malformed or registered twice.
    #[error("invalid route '{pattern}': {reason}")]
    InvalidRoute {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Reading the local address of the listener failed.
    #[error("listener error: {0}")]
    Listener(#[source] std::io::Error),
}

impl ServerError {
    pub(crate) fn invalid_route(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_route_message() {
        let err = ServerError::invalid_route("reports", "must start with '/'");
        assert_eq!(err.to_string(), "invalid route 'reports': must start with '/'");
    }

    #[test]
    fn test_invalid_address_has_source() {
        let source = "nope".parse::<SocketAddr>().unwrap_err();
        let err = ServerError::InvalidAddress {
            addr: "nope".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("'nope'"));
    }
}
