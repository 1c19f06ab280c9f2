//! PEM framing for DER certificates
//!
//! The body is wrapped one character at a time: a line break follows every
//! `wrap_width`-th character, and the final short line (if any) is closed
//! before the footer. Input is treated as an opaque character sequence, the
//! base64 alphabet is not validated.

use base64::{Engine, engine::general_purpose::STANDARD};

pub const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----";
pub const PEM_FOOTER: &str = "-----END CERTIFICATE-----";

/// Conventional PEM line width
pub const DEFAULT_WRAP_WIDTH: usize = 64;

/// Frame an already base64-encoded certificate body as PEM.
///
/// A `wrap_width` of 0 is treated as 1.
#[must_use]
pub fn encode(base64_body: &str, wrap_width: usize) -> String {
    let width = wrap_width.max(1);
    let mut pem = String::with_capacity(
        PEM_HEADER.len() + PEM_FOOTER.len() + base64_body.len() + base64_body.len() / width + 3,
    );

    pem.push_str(PEM_HEADER);
    pem.push('\n');

    for (i, c) in base64_body.chars().enumerate() {
        pem.push(c);
        if (i + 1) % width == 0 {
            pem.push('\n');
        }
    }

    // close a short last line; an exact multiple already ends with a break
    if !pem.ends_with('\n') {
        pem.push('\n');
    }

    pem.push_str(PEM_FOOTER);
    pem
}

/// Base64-encode DER bytes and frame them at the conventional width
#[must_use]
pub fn encode_der(der: &[u8]) -> String {
    encode(&STANDARD.encode(der), DEFAULT_WRAP_WIDTH)
}

/// Strip the PEM framing and line breaks, returning the base64 body.
///
/// Returns `None` if the header or footer is missing.
#[must_use]
pub fn decode(pem: &str) -> Option<String> {
    let body = pem
        .trim()
        .strip_prefix(PEM_HEADER)?
        .strip_suffix(PEM_FOOTER)?;

    Some(body.chars().filter(|c| *c != '\n' && *c != '\r').collect())
}
