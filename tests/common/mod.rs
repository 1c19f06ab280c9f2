#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, date_time_ymd};
use rustls::{
    ServerConfig,
    crypto::ring::default_provider,
    pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::mpsc,
    task::JoinHandle,
    time::{Duration, timeout},
};
use tokio_rustls::TlsAcceptor;

pub const TEST_CN: &str = "peercert self-signed";
pub const TEST_OU: &str = "Testing";
pub const TEST_VALID_FROM: &str = "Nov  8 00:00:00 2015 GMT";
pub const TEST_VALID_TO: &str = "Aug 22 00:00:00 2017 GMT";

/// Local TLS server presenting an expired, self-signed certificate for `localhost`
pub struct TestServer {
    pub port: u16,
    pub cert_der: Vec<u8>,
    pub accepted: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Self-signed certificate valid from 2015-11-08 to 2017-08-22 (already expired)
pub fn expired_self_signed() -> (CertificateDer<'static>, PrivateKeyDer<'static>) {
    let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    params.distinguished_name = DistinguishedName::new();
    params.distinguished_name.push(DnType::CommonName, TEST_CN);
    params
        .distinguished_name
        .push(DnType::OrganizationalUnitName, TEST_OU);
    params.not_before = date_time_ymd(2015, 11, 8);
    params.not_after = date_time_ymd(2017, 8, 22);

    let key_pair = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key_pair).unwrap();

    (
        cert.der().clone(),
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der())),
    )
}

pub async fn spawn_tls_server() -> TestServer {
    let (cert, key) = expired_self_signed();
    let cert_der = cert.to_vec();

    let config = ServerConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    let handle = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    // hold the session until the client closes it
                    let mut buf = [0u8; 256];
                    while let Ok(n) = tls.read(&mut buf).await {
                        if n == 0 {
                            break;
                        }
                    }
                }
            });
        }
    });

    TestServer {
        port,
        cert_der,
        accepted,
        handle,
    }
}

/// Server that accepts TCP connections and never answers.
///
/// Each accepted connection reports on the returned channel once the client
/// side has gone away (EOF or reset).
pub async fn spawn_silent_server() -> (u16, mpsc::UnboundedReceiver<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let closed_tx = closed_tx.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                // drain the ClientHello, wait for the client to go away
                while let Ok(n) = stream.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
                let _ = closed_tx.send(());
            });
        }
    });

    (port, closed_rx, handle)
}

/// Server that answers any connection with plain text instead of TLS
pub async fn spawn_plaintext_server() -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = stream
                    .write_all(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n")
                    .await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (port, handle)
}

/// Wait for a notification, failing the test if it does not arrive in time
pub async fn expect_notification(rx: &mut mpsc::UnboundedReceiver<()>, within: Duration) {
    timeout(within, rx.recv())
        .await
        .expect("timed out waiting for notification")
        .expect("notification channel closed");
}

/// Returns a port nothing is listening on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

