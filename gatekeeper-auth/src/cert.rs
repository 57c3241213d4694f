//! X.509 helpers for certificates extracted from a container.
//!
//! # Security
//!
//! - Certificate input is capped at 16KB to prevent DoS
//! - ASN.1 parsing is delegated to the x509_parser library

use thiserror::Error;
use x509_parser::prelude::*;

/// Maximum certificate size (16KB is generous for a single cert)
pub const MAX_CERT_SIZE: usize = 16 * 1024;

/// Errors that can occur while reading a certificate.
#[derive(Debug, Error)]
pub enum CertError {
    #[error("certificate too large: {0} bytes (max {MAX_CERT_SIZE})")]
    TooLarge(usize),

    #[error("failed to parse X.509 certificate: {0}")]
    ParseError(String),
}

/// Extract raw public key bytes from a DER-encoded X.509 certificate.
///
/// The result is the subject public key as it appears in the certificate,
/// suitable for fingerprinting.
///
/// # Errors
///
/// Returns `CertError::TooLarge` if the certificate exceeds 16KB.
/// Returns `CertError::ParseError` if the certificate is malformed.
pub fn extract_public_key_from_cert(cert_der: &[u8]) -> Result<Vec<u8>, CertError> {
    if cert_der.len() > MAX_CERT_SIZE {
        return Err(CertError::TooLarge(cert_der.len()));
    }

    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| CertError::ParseError(format!("{:?}", e)))?;

    Ok(cert.public_key().subject_public_key.data.to_vec())
}

/// Extract the subject common name from a DER-encoded X.509 certificate.
///
/// Used as a label fallback when a container entry carries no friendly
/// name. Returns `None` rather than an error: a missing or odd CN is not a
/// parse failure.
pub fn subject_common_name(cert_der: &[u8]) -> Option<String> {
    if cert_der.len() > MAX_CERT_SIZE {
        return None;
    }

    let (_, cert) = X509Certificate::from_der(cert_der).ok()?;
    let cn = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(|cn| cn.to_string());
    cn
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_CERT_DER: &[u8] =
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/client.der"));

    #[test]
    fn test_cert_too_large() {
        let large_data = vec![0u8; MAX_CERT_SIZE + 1];
        let result = extract_public_key_from_cert(&large_data);
        assert!(matches!(result, Err(CertError::TooLarge(_))));
    }

    #[test]
    fn test_invalid_cert() {
        let invalid_data = b"not a certificate";
        let result = extract_public_key_from_cert(invalid_data);
        assert!(matches!(result, Err(CertError::ParseError(_))));
    }

    #[test]
    fn test_extracts_public_key() {
        let key = extract_public_key_from_cert(CLIENT_CERT_DER).unwrap();
        assert!(!key.is_empty());
    }

    #[test]
    fn test_subject_common_name() {
        let cn = subject_common_name(CLIENT_CERT_DER);
        assert_eq!(cn.as_deref(), Some("gatekeeper-client"));
    }

    #[test]
    fn test_subject_common_name_invalid_input() {
        assert_eq!(subject_common_name(b"garbage"), None);
    }
}
