//! Session-scoped client credentials.

use crate::identity::{KeyIdentity, TrustObject};

/// How long a credential may outlive the challenge that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Persistence {
    /// Valid for the current process session only; never written to disk.
    ForSession,
}

/// A ready-to-present client credential.
///
/// Wraps a [`KeyIdentity`] and is safe to reuse across multiple challenge
/// responses within the process lifetime. It is never persisted: the only
/// supported persistence scope is [`Persistence::ForSession`].
///
/// A credential can only be obtained through
/// [`Identity::to_credential`](crate::identity::Identity::to_credential),
/// which guarantees a private-key identity is present.
#[derive(Clone)]
pub struct Credential {
    key_identity: KeyIdentity,
    /// Explicit extra certificates. Always absent: the key identity alone
    /// suffices for the TLS layer to present the full chain.
    certificates: Option<Vec<TrustObject>>,
    persistence: Persistence,
}

impl Credential {
    pub(crate) fn for_session(key_identity: KeyIdentity) -> Self {
        Self {
            key_identity,
            certificates: None,
            persistence: Persistence::ForSession,
        }
    }

    /// The private-key identity backing this credential.
    #[must_use]
    pub fn key_identity(&self) -> &KeyIdentity {
        &self.key_identity
    }

    /// Explicit certificate list, if any (currently always `None`).
    #[must_use]
    pub fn certificates(&self) -> Option<&[TrustObject]> {
        self.certificates.as_deref()
    }

    /// The credential's persistence scope.
    #[must_use]
    pub fn persistence(&self) -> Persistence {
        self.persistence
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("key_identity", &self.key_identity)
            .field("persistence", &self.persistence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_CERT_DER: &[u8] =
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/client.der"));

    #[test]
    fn credential_is_session_scoped_with_no_cert_list() {
        let key_identity = KeyIdentity::new(vec![0u8; 8], CLIENT_CERT_DER.to_vec()).unwrap();
        let credential = Credential::for_session(key_identity);

        assert_eq!(credential.persistence(), Persistence::ForSession);
        assert!(credential.certificates().is_none());
    }
}
