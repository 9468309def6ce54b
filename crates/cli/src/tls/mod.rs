//! # TLS Configuration
//!
//! Builds the rustls server configuration used by `crm serve --tls`.

use std::{io, sync::Arc};

use error::{AppError, Result};
use rustls::{
    pki_types::{pem::PemObject as _, CertificateDer, PrivateKeyDer},
    ServerConfig,
};

/// Reads every certificate in a PEM file. The leaf must come first.
pub fn load_certs(path: &str) -> io::Result<Vec<CertificateDer<'static>>> {
    let pem = std::fs::read(path)?;
    let certs = CertificateDer::pem_slice_iter(&pem)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if certs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no certificates found in {}", path),
        ));
    }
    Ok(certs)
}

/// Reads the first private key (PKCS#1, PKCS#8 or SEC1) from a PEM file.
pub fn load_private_key(path: &str) -> io::Result<PrivateKeyDer<'static>> {
    let pem = std::fs::read(path)?;
    PrivateKeyDer::from_pem_slice(&pem).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Loads the certificate chain and key and builds a server config that
/// offers HTTP/2 and HTTP/1.1 over ALPN.
pub fn server_config(cert_path: &str, key_path: &str) -> Result<Arc<ServerConfig>> {
    let certs = load_certs(cert_path).map_err(|e| AppError::config(format!("Failed to load TLS certificate: {}", e)))?;
    let key = load_private_key(key_path).map_err(|e| AppError::config(format!("Failed to load TLS private key: {}", e)))?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| AppError::config(format!("Invalid TLS certificate or key: {}", e)))?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    fn temp_with(content: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_load_certs_empty_file() {
        let file = temp_with("");
        let err = load_certs(file.path().to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_certs_without_pem_sections() {
        let file = temp_with("not a certificate");
        assert!(load_certs(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_load_certs_missing_file() {
        let err = load_certs("/nonexistent/crm/cert.pem").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_load_private_key_without_key() {
        let file = temp_with("-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----\n");
        assert!(load_private_key(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_server_config_reports_certificate_path() {
        let key = temp_with("");
        let err = server_config("/nonexistent/crm/cert.pem", key.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("TLS certificate"));
    }
}
