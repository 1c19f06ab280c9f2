//! Fetch the X.509 certificate a TLS server presents, without validating it,
//! and render it as PEM.

pub mod cli;
pub mod error;
pub mod pem;
pub mod tls;

pub use error::{FetchError, Result};
