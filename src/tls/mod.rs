//! Peer certificate retrieval
//!
//! Connects to a host, completes a TLS handshake **without verifying the
//! certificate**, and returns the certificate the server presented together
//! with its PEM encoding.
//!
//! # Security
//!
//! Verification is disabled on purpose so that expired, self-signed and
//! mismatched certificates can be inspected. Nothing returned here says
//! the peer is who it claims to be.
//!
//! # Module Organization
//!
//! - `config` - fetch options and schemes
//! - `certificate` - certificate model and DER extraction
//! - `probe` - connection, handshake and the fetch flow
//! - `verifier` - the accept-anything certificate verifier
//!
//! # Example
//!
//! ```rust,ignore
//! use peercert::tls::{FetchOptions, fetch};
//! use std::time::Duration;
//!
//! let options = FetchOptions::default().with_timeout(Duration::from_secs(5));
//! let certificate = fetch("example.com", options)?.await?;
//! println!("{}", certificate.pem_encoded.unwrap_or_default());
//! ```

pub mod certificate;
pub mod config;
pub mod probe;
pub mod verifier;

// Re-export commonly used types
pub use certificate::{Certificate, DistinguishedName, DnValue};
pub use config::{FetchOptions, Scheme};
pub use probe::{Handshake, PeerSession, TlsProbe, fetch, fetch_with};
pub use verifier::AcceptAnyCertificate;
