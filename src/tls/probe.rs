use super::{AcceptAnyCertificate, Certificate, FetchOptions};
use crate::{
    error::{FetchError, Result},
    pem,
};
use rustls::{
    ClientConfig,
    client::Resumption,
    crypto::{CryptoProvider, ring},
    pki_types::ServerName,
};
use std::{future::Future, net::IpAddr, sync::Arc};
use tokio::{io::AsyncWriteExt, net::TcpStream, time};
use tokio_rustls::{TlsConnector, client::TlsStream};
use tracing::{debug, warn};

/// Establishes the TLS session a certificate is read from.
///
/// [`TlsProbe`] is the network implementation; the trait exists so the
/// fetch flow can run against any session source.
pub trait Handshake {
    type Session: PeerSession + Send;

    /// Connect to `host:port` and complete a TLS client handshake
    fn handshake(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// An established session the peer certificate can be read from
pub trait PeerSession {
    /// First certificate the peer presented, empty if it presented none
    fn peer_certificate(&self) -> Certificate;

    /// Release the connection
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Handshake-only TLS client with certificate verification disabled.
///
/// # Security
///
/// Uses [`AcceptAnyCertificate`]: every certificate is accepted and nothing
/// about the peer's identity is established. Only use it to look at what a
/// server presents.
#[derive(Clone)]
pub struct TlsProbe {
    connector: TlsConnector,
}

impl TlsProbe {
    /// # Errors
    ///
    /// Returns an error if the TLS client configuration cannot be built
    pub fn new() -> Result<Self> {
        let config = build_client_config()?;
        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
        })
    }
}

impl Handshake for TlsProbe {
    type Session = TlsStream<TcpStream>;

    async fn handshake(&self, host: &str, port: u16) -> Result<Self::Session> {
        let server_name = server_name_from_host(host)?;

        debug!(host, port, "connecting");
        let stream = TcpStream::connect((host, port)).await?;

        debug!(host, port, "starting TLS handshake");
        let tls_stream = self.connector.connect(server_name, stream).await?;

        let (_, connection) = tls_stream.get_ref();
        debug!(
            host,
            port,
            version = ?connection.protocol_version(),
            cipher = ?connection.negotiated_cipher_suite().map(|suite| suite.suite()),
            "TLS handshake completed"
        );

        Ok(tls_stream)
    }
}

impl PeerSession for TlsStream<TcpStream> {
    fn peer_certificate(&self) -> Certificate {
        let (_, connection) = self.get_ref();
        connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .map_or_else(Certificate::default, |der| Certificate::from_der(der.as_ref()))
    }

    async fn close(mut self) {
        // close_notify, then the socket is dropped with `self`
        if let Err(e) = self.shutdown().await {
            debug!("failed to shut down TLS session: {e}");
        }
    }
}

/// Fetch the certificate presented by `host`.
///
/// The host is validated before this returns, so an empty host fails here
/// with [`FetchError::InvalidArgument`] and no connection is attempted. The
/// returned future performs exactly one connection attempt.
///
/// # Security
///
/// Certificate verification is disabled, see [`TlsProbe`].
///
/// # Errors
///
/// Returns [`FetchError::InvalidArgument`] for an empty or invalid host and
/// [`FetchError::Tls`] if the client configuration cannot be built. The
/// future resolves to [`FetchError::NoCertificate`], [`FetchError::Timeout`]
/// or the transport error, see [`fetch_with`].
pub fn fetch(
    host: &str,
    options: FetchOptions,
) -> Result<impl Future<Output = Result<Certificate>> + Send + use<>> {
    fetch_with(TlsProbe::new()?, host, options)
}

/// Run the fetch flow over any [`Handshake`].
///
/// The future settles once: with the certificate, with the handshake error
/// unchanged, with [`FetchError::NoCertificate`] if the certificate is
/// empty, or with [`FetchError::Timeout`], in which case the in-flight
/// attempt and its connection are dropped.
///
/// # Errors
///
/// Returns [`FetchError::InvalidArgument`] if `host` is empty or is not a
/// valid server name.
pub fn fetch_with<H>(
    handshake: H,
    host: &str,
    options: FetchOptions,
) -> Result<impl Future<Output = Result<Certificate>> + Send + use<H>>
where
    H: Handshake + Send + Sync + 'static,
{
    let host = validate_host(host)?;

    Ok(async move {
        let port = options.port();
        let outcome = attempt(&handshake, &host, port);

        match options.timeout {
            Some(limit) => time::timeout(limit, outcome).await.unwrap_or_else(|_| {
                warn!(host = %host, port, "timed out after {limit:?}");
                Err(FetchError::Timeout { after: limit })
            }),
            None => outcome.await,
        }
    })
}

async fn attempt<H: Handshake + Sync>(handshake: &H, host: &str, port: u16) -> Result<Certificate> {
    let session = handshake.handshake(host, port).await?;
    let mut certificate = session.peer_certificate();
    session.close().await;

    if certificate.is_empty() {
        debug!(host, port, "peer did not present a certificate");
        return Err(FetchError::NoCertificate);
    }

    if let Some(raw) = &certificate.raw {
        certificate.pem_encoded = Some(pem::encode_der(raw));
    }

    Ok(certificate)
}

fn validate_host(host: &str) -> Result<String> {
    let host = host.trim();
    if host.is_empty() {
        return Err(FetchError::InvalidArgument(
            "a valid host is required".to_string(),
        ));
    }

    server_name_from_host(host)?;

    Ok(host.to_string())
}

fn server_name_from_host(host: &str) -> Result<ServerName<'static>> {
    host.parse::<IpAddr>().map_or_else(
        |_| {
            ServerName::try_from(host.to_string())
                .map_err(|_| FetchError::InvalidArgument(format!("invalid server name: {host}")))
        },
        |ip| Ok(ServerName::from(ip)),
    )
}

/// Client configuration offering every protocol version and cipher suite
/// the ring provider implements, with verification and resumption disabled
fn build_client_config() -> Result<ClientConfig> {
    let provider = Arc::new(CryptoProvider {
        cipher_suites: ring::ALL_CIPHER_SUITES.to_vec(),
        ..ring::default_provider()
    });
    let verifier = Arc::new(AcceptAnyCertificate::new(&provider));

    let mut config = ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(rustls::ALL_VERSIONS)?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth();

    // every fetch is an independent connection
    config.resumption = Resumption::disabled();

    Ok(config)
}
