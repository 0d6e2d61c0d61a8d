use std::path::Path;

use reqwest::{Certificate, ClientBuilder, Identity};
use x509_parser::pem::Pem;

use crate::config::model::SecurityFlags;
use crate::error::Error;
use crate::target::Endpoint;

/// TLS stance for a single attempt.
pub struct TrustPolicy {
    pub skip_verification: bool,
    pub roots: Vec<Certificate>,
    pub identity: Option<Identity>,
}

impl TrustPolicy {
    /// Applies the policy to a fresh client builder.
    pub fn apply(self, mut builder: ClientBuilder) -> ClientBuilder {
        builder = builder
            .use_rustls_tls()
            .danger_accept_invalid_certs(self.skip_verification);
        for root in self.roots {
            builder = builder.add_root_certificate(root);
        }
        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }
        builder
    }
}

/// IP targets rarely carry a certificate for their address, so they skip
/// verification unless `--strict-ssl` is set. `--insecure` always skips.
pub fn skip_verification(endpoint: &Endpoint, flags: &SecurityFlags) -> bool {
    flags.insecure || (endpoint.is_ip_literal && !flags.strict_ssl)
}

/// Computes the trust policy for one attempt, loading any certificate
/// material from disk.
pub fn resolve(endpoint: &Endpoint, flags: &SecurityFlags) -> Result<TrustPolicy, Error> {
    let roots = match &flags.ca_cert_path {
        Some(path) => load_ca_bundle(path)?,
        None => Vec::new(),
    };

    let identity = match (&flags.cert_path, &flags.key_path) {
        (Some(cert), Some(key)) => Some(load_identity(cert, key)?),
        (Some(_), None) => return Err(Error::tls_config("--cert requires --key to be specified")),
        (None, Some(_)) => return Err(Error::tls_config("--key requires --cert to be specified")),
        (None, None) => None,
    };

    Ok(TrustPolicy {
        skip_verification: skip_verification(endpoint, flags),
        roots,
        identity,
    })
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>, Error> {
    let pem = std::fs::read(path).map_err(|e| {
        Error::tls_config(format!("failed to read CA certificate {}: {e}", path.display()))
    })?;

    // reqwest accepts a bundle without complaint even when nothing in it is
    // a certificate, so check the blocks first.
    let mut parsed = 0;
    for block in Pem::iter_from_buffer(&pem) {
        let block = block.map_err(|e| {
            Error::tls_config(format!("failed to parse CA certificate {}: {e}", path.display()))
        })?;
        block.parse_x509().map_err(|e| {
            Error::tls_config(format!("failed to parse CA certificate {}: {e}", path.display()))
        })?;
        parsed += 1;
    }
    if parsed == 0 {
        return Err(Error::tls_config(format!(
            "failed to parse CA certificate {}: no PEM certificates found",
            path.display()
        )));
    }

    Certificate::from_pem_bundle(&pem).map_err(|e| {
        Error::tls_config(format!("failed to parse CA certificate {}: {e}", path.display()))
    })
}

fn load_identity(cert: &Path, key: &Path) -> Result<Identity, Error> {
    let mut pem = std::fs::read(key).map_err(|e| {
        Error::tls_config(format!("failed to read client key {}: {e}", key.display()))
    })?;
    let cert_pem = std::fs::read(cert).map_err(|e| {
        Error::tls_config(format!(
            "failed to read client certificate {}: {e}",
            cert.display()
        ))
    })?;
    pem.push(b'\n');
    pem.extend_from_slice(&cert_pem);

    Identity::from_pem(&pem)
        .map_err(|e| Error::tls_config(format!("failed to load client certificate: {e}")))
}
