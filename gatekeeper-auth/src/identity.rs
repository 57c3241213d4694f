//! Identity types produced by container parsing.
//!
//! The underlying platform handles (private-key identity, evaluated trust)
//! are modelled as opaque capability tokens over DER bytes:
//! - [`KeyIdentity`] pairs a PKCS#8 private key with its leaf certificate
//! - [`TrustObject`] wraps a certificate that stands in for a trust handle
//!
//! Secret handling follows the usual rules:
//! - Private key DER is zeroized on drop
//! - No Debug implementations that leak key material
//! - Fingerprints use constant-time comparison
//! - Fingerprint format: `SHA256:{url_safe_base64_no_padding}`

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rustls_pki_types::CertificateDer;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::cert::{extract_public_key_from_cert, CertError};
use crate::credential::Credential;

/// SHA-256 fingerprint of a certificate's public key.
///
/// Rendered as `SHA256:{url_safe_base64_no_padding}`. Fingerprints are not
/// secret; they exist so log lines and tests can talk about a credential
/// without carrying key material around.
#[derive(Clone)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute a fingerprint from raw subject-public-key bytes.
    #[must_use]
    pub fn from_public_key(spki: &[u8]) -> Self {
        Self(Sha256::digest(spki).into())
    }

    /// The raw hash bytes.
    #[must_use]
    pub fn hash_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time: fingerprints get compared against attacker-supplied
        // certificates.
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Fingerprint {}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SHA256:{}", URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// An opaque trust handle: a DER-encoded certificate that participates in
/// chain evaluation. Certificates are public material, but the bytes are
/// still kept behind accessors so callers treat the handle as opaque.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustObject(CertificateDer<'static>);

impl TrustObject {
    /// Wrap a DER-encoded certificate.
    #[must_use]
    pub fn from_der(der: Vec<u8>) -> Self {
        Self(CertificateDer::from(der))
    }

    /// The DER bytes of the underlying certificate.
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for TrustObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustObject")
            .field("der_len", &self.0.as_ref().len())
            .finish()
    }
}

/// A private-key identity: the pairing of a private key with its leaf
/// certificate, usable to prove possession during a TLS handshake.
///
/// The key DER uses `Zeroizing` so key material is erased from memory when
/// the identity is dropped.
#[derive(Clone)]
pub struct KeyIdentity {
    /// PKCS#8 DER private key - zeroized on drop
    key_der: Zeroizing<Vec<u8>>,
    /// DER-encoded leaf certificate
    cert_der: CertificateDer<'static>,
    /// Fingerprint of the leaf certificate's public key
    fingerprint: Fingerprint,
}

impl KeyIdentity {
    /// Pair a PKCS#8 DER private key with its DER leaf certificate.
    ///
    /// # Errors
    ///
    /// Fails if the certificate cannot be parsed; the fingerprint is
    /// derived from its public key at construction time.
    pub fn new(key_der: Vec<u8>, cert_der: Vec<u8>) -> Result<Self, CertError> {
        let spki = extract_public_key_from_cert(&cert_der)?;
        Ok(Self {
            key_der: Zeroizing::new(key_der),
            cert_der: CertificateDer::from(cert_der),
            fingerprint: Fingerprint::from_public_key(&spki),
        })
    }

    /// The PKCS#8 DER private key bytes.
    ///
    /// # Security
    ///
    /// The returned reference should not be copied into long-lived storage;
    /// doing so defeats the automatic zeroization.
    #[must_use]
    pub fn key_der(&self) -> &[u8] {
        &self.key_der
    }

    /// The DER bytes of the leaf certificate.
    #[must_use]
    pub fn cert_der(&self) -> &[u8] {
        self.cert_der.as_ref()
    }

    /// Fingerprint of the leaf certificate's public key.
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

impl std::fmt::Debug for KeyIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyIdentity")
            .field("fingerprint", &self.fingerprint)
            .field("cert_der_len", &self.cert_der.as_ref().len())
            .finish()
    }
}

/// The parsed, immutable result of decrypting a certificate container.
///
/// Every field is optional because a container can decrypt successfully and
/// still be missing pieces (a truststore has certificates but no key). An
/// identity without a [`KeyIdentity`] is usable only for inspection - it
/// can never produce a credential.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    label: Option<String>,
    key_id: Option<Vec<u8>>,
    trust: Option<TrustObject>,
    cert_chain: Option<Vec<TrustObject>>,
    key_identity: Option<KeyIdentity>,
}

impl Identity {
    pub(crate) fn new(
        label: Option<String>,
        key_id: Option<Vec<u8>>,
        trust: Option<TrustObject>,
        cert_chain: Option<Vec<TrustObject>>,
        key_identity: Option<KeyIdentity>,
    ) -> Self {
        Self {
            label,
            key_id,
            trust,
            cert_chain,
            key_identity,
        }
    }

    /// Friendly name of the container entry, when present.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Opaque key identifier stored alongside the private key.
    #[must_use]
    pub fn key_id(&self) -> Option<&[u8]> {
        self.key_id.as_deref()
    }

    /// Trust handle for the entry's certificate.
    #[must_use]
    pub fn trust(&self) -> Option<&TrustObject> {
        self.trust.as_ref()
    }

    /// Full certificate chain, leaf first.
    #[must_use]
    pub fn cert_chain(&self) -> Option<&[TrustObject]> {
        self.cert_chain.as_deref()
    }

    /// The private-key identity, when the container held one.
    #[must_use]
    pub fn key_identity(&self) -> Option<&KeyIdentity> {
        self.key_identity.as_ref()
    }

    /// Derive a session-scoped [`Credential`] from this identity.
    ///
    /// Returns `None` when the container yielded no private-key identity;
    /// such an identity cannot authenticate anything. The credential
    /// carries no explicit certificate list - the key identity alone is
    /// enough for the TLS layer to present the chain.
    #[must_use]
    pub fn to_credential(&self) -> Option<Credential> {
        let key_identity = self.key_identity.as_ref()?.clone();
        Some(Credential::for_session(key_identity))
    }
}
