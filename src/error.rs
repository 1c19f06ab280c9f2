use std::time::Duration;
use thiserror::Error;

/// Message returned when the peer completed a handshake without presenting a certificate
pub const NO_CERTIFICATE_MESSAGE: &str = "The website did not provide a certificate";

/// Errors returned by [`crate::tls::fetch`]
#[derive(Error, Debug)]
pub enum FetchError {
    /// Rejected before any I/O started (empty host, invalid server name, unknown scheme)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The handshake completed but the peer certificate was empty
    #[error("The website did not provide a certificate")]
    NoCertificate,

    /// The configured timeout elapsed; the in-flight connection was dropped
    #[error("Request timed out.")]
    Timeout { after: Duration },

    /// DNS, connect or handshake failure, passed through as reported by the transport
    #[error(transparent)]
    Network(#[from] std::io::Error),

    /// The TLS client configuration could not be built
    #[error(transparent)]
    Tls(#[from] rustls::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
