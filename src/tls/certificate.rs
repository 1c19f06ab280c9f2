use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, net::IpAddr};
use tracing::warn;
use x509_parser::{
    objects::{oid_registry, oid2abbrev},
    prelude::{ASN1Time, FromDer, GeneralName, X509Certificate, X509Name},
};

/// Date layout used by OpenSSL when printing certificate validity, e.g. `Nov  8 00:00:00 2015 GMT`
const CERT_DATE_FORMAT: &str = "%b %e %H:%M:%S %Y GMT";

/// Peer certificate as extracted from a TLS session.
///
/// Every field is optional: a certificate with no populated field is
/// considered absent, see [`Certificate::is_empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Certificate {
    #[serde(skip_serializing_if = "DistinguishedName::is_empty")]
    pub subject: DistinguishedName,
    #[serde(skip_serializing_if = "DistinguishedName::is_empty")]
    pub issuer: DistinguishedName,
    /// Subject alternative names, e.g. `DNS:example.com, IP Address:127.0.0.1`
    #[serde(rename = "subjectaltname", skip_serializing_if = "Option::is_none")]
    pub subject_alt_names: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    /// Upper-case hex
    #[serde(rename = "serialNumber", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// SHA-1 of the DER bytes, colon-separated upper-case hex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// SHA-256 of the DER bytes, colon-separated upper-case hex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint256: Option<String>,
    /// DER-encoded certificate, serialized as base64
    #[serde(
        serialize_with = "serialize_raw",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw: Option<Vec<u8>>,
    #[serde(rename = "pemEncoded", skip_serializing_if = "Option::is_none")]
    pub pem_encoded: Option<String>,
}

impl Certificate {
    /// Build a certificate from DER bytes.
    ///
    /// Empty input yields an empty certificate. Bytes that do not parse as
    /// X.509 still produce `raw` and the fingerprints, the decoded fields
    /// stay empty.
    #[must_use]
    pub fn from_der(der: &[u8]) -> Self {
        if der.is_empty() {
            return Self::default();
        }

        let mut certificate = Self {
            fingerprint: Some(colon_hex(&Sha1::digest(der))),
            fingerprint256: Some(colon_hex(&Sha256::digest(der))),
            raw: Some(der.to_vec()),
            ..Default::default()
        };

        match X509Certificate::from_der(der) {
            Ok((_, cert)) => certificate.fill_from(&cert),
            Err(e) => warn!("failed to parse peer certificate, returning raw bytes only: {e}"),
        }

        certificate
    }

    fn fill_from(&mut self, cert: &X509Certificate<'_>) {
        self.subject = DistinguishedName::from_x509(cert.subject());
        self.issuer = DistinguishedName::from_x509(cert.issuer());
        self.subject_alt_names = subject_alt_names(cert);
        self.valid_from = format_cert_time(&cert.validity().not_before);
        self.valid_to = format_cert_time(&cert.validity().not_after);
        self.serial_number = Some(hex::encode_upper(cert.raw_serial()));
    }

    /// Number of populated fields
    #[must_use]
    pub fn field_count(&self) -> usize {
        [
            !self.subject.is_empty(),
            !self.issuer.is_empty(),
            self.subject_alt_names.is_some(),
            self.valid_from.is_some(),
            self.valid_to.is_some(),
            self.serial_number.is_some(),
            self.fingerprint.is_some(),
            self.fingerprint256.is_some(),
            self.raw.is_some(),
            self.pem_encoded.is_some(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    /// A certificate without any populated field stands for "no certificate"
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

/// Value of a distinguished-name attribute; repeated attributes (two `OU`s) become a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DnValue {
    Single(String),
    Multiple(Vec<String>),
}

impl DnValue {
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        }
    }
}

/// Distinguished name keyed by attribute short name (`CN`, `O`, `OU`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DistinguishedName(BTreeMap<String, DnValue>);

impl DistinguishedName {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, turning an existing single value into a list
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let key = key.into();

        let merged = match self.0.remove(&key) {
            None => DnValue::Single(value),
            Some(DnValue::Single(first)) => DnValue::Multiple(vec![first, value]),
            Some(DnValue::Multiple(mut values)) => {
                values.push(value);
                DnValue::Multiple(values)
            }
        };
        self.0.insert(key, merged);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DnValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DnValue)> {
        self.0.iter()
    }

    fn from_x509(name: &X509Name<'_>) -> Self {
        let mut dn = Self::new();

        for rdn in name.iter() {
            for attr in rdn.iter() {
                let oid = attr.attr_type();
                let key = oid2abbrev(oid, oid_registry())
                    .map_or_else(|_| oid.to_id_string(), ToString::to_string);

                match attr.as_str() {
                    Ok(value) => dn.push(key, value),
                    Err(e) => warn!("skipping non-string DN attribute {key}: {e}"),
                }
            }
        }

        dn
    }
}

fn subject_alt_names(cert: &X509Certificate<'_>) -> Option<String> {
    let san = match cert.subject_alternative_name() {
        Ok(Some(san)) => san,
        Ok(None) => return None,
        Err(e) => {
            warn!("failed to parse subjectAltName extension: {e}");
            return None;
        }
    };

    let names: Vec<String> = san
        .value
        .general_names
        .iter()
        .filter_map(|name| match name {
            GeneralName::DNSName(dns) => Some(format!("DNS:{dns}")),
            GeneralName::RFC822Name(email) => Some(format!("email:{email}")),
            GeneralName::URI(uri) => Some(format!("URI:{uri}")),
            GeneralName::IPAddress(bytes) => ip_from_bytes(bytes).map(|ip| format!("IP Address:{ip}")),
            _ => None,
        })
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
        return Some(IpAddr::from(v4));
    }
    <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from)
}

fn format_cert_time(time: &ASN1Time) -> Option<String> {
    let raw = time.to_datetime();
    DateTime::<Utc>::from_timestamp(raw.unix_timestamp(), raw.nanosecond())
        .map(|dt| dt.format(CERT_DATE_FORMAT).to_string())
}

fn colon_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[allow(clippy::ref_option)]
fn serialize_raw<S: Serializer>(raw: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match raw {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}
