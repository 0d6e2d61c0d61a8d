//! Local servers used by the probe tests.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_rustls::TlsAcceptor;

pub const BODY: &str = "Hello";

fn response(status: u16) -> String {
    format!(
        "HTTP/1.1 {status} Mock\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nX-Mock: purl\r\nConnection: close\r\n\r\n{BODY}",
        BODY.len()
    )
}

async fn answer<S: AsyncRead + AsyncWrite + Unpin>(mut stream: S, status: u16) {
    let mut buf = [0u8; 8192];
    match timeout(Duration::from_secs(5), stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {}
        _ => return,
    }
    let _ = stream.write_all(response(status).as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Plain HTTP/1.1 server answering every request with a fixed status.
pub struct MockHttpServer {
    listener: TcpListener,
    status: u16,
}

impl MockHttpServer {
    pub async fn new(status: u16) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener, status })
    }

    pub fn authority(&self) -> String {
        let port = self.listener.local_addr().map(|a| a.port()).unwrap_or(0);
        format!("127.0.0.1:{port}")
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Ok((stream, _)) = self.listener.accept().await {
                tokio::spawn(answer(stream, self.status));
            }
        })
    }
}

/// HTTPS server with a freshly generated self-signed certificate.
pub struct MockTlsServer {
    listener: TcpListener,
    acceptor: TlsAcceptor,
    cert_pem: String,
    status: u16,
}

impl MockTlsServer {
    pub async fn new(status: u16) -> io::Result<Self> {
        let generated =
            rcgen::generate_simple_self_signed(vec!["127.0.0.1".to_string(), "localhost".to_string()])
                .map_err(io::Error::other)?;
        let cert_pem = generated.cert.pem();
        let cert: CertificateDer<'static> = generated.cert.der().clone();
        let key = PrivatePkcs8KeyDer::from(generated.signing_key.serialize_der());

        let config = rustls::ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .map_err(io::Error::other)?
        .with_no_client_auth()
        .with_single_cert(vec![cert], key.into())
        .map_err(io::Error::other)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self {
            listener,
            acceptor: TlsAcceptor::from(Arc::new(config)),
            cert_pem,
            status,
        })
    }

    pub fn authority(&self) -> String {
        let port = self.listener.local_addr().map(|a| a.port()).unwrap_or(0);
        format!("127.0.0.1:{port}")
    }

    /// Same listener, addressed by name so certificates get verified.
    pub fn localhost_authority(&self) -> String {
        let port = self.listener.local_addr().map(|a| a.port()).unwrap_or(0);
        format!("localhost:{port}")
    }

    /// The self-signed server certificate, usable as a CA bundle.
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Ok((stream, _)) = self.listener.accept().await {
                let acceptor = self.acceptor.clone();
                let status = self.status;
                tokio::spawn(async move {
                    if let Ok(stream) = acceptor.accept(stream).await {
                        answer(stream, status).await;
                    }
                });
            }
        })
    }
}

/// Accepts connections and never writes a byte.
pub struct SilentServer {
    listener: TcpListener,
}

impl SilentServer {
    pub async fn new() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn authority(&self) -> String {
        let port = self.listener.local_addr().map(|a| a.port()).unwrap_or(0);
        format!("127.0.0.1:{port}")
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = self.listener.accept().await {
                held.push(stream);
            }
        })
    }
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}
