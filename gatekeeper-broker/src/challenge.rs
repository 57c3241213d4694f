//! Challenge and disposition types for the authentication boundary.

use std::sync::Arc;

use gatekeeper_auth::Credential;

/// Authentication method requested by a protection space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AuthenticationMethod {
    /// The server asks the client to present a certificate.
    ClientCertificate,
    /// The client is asked to evaluate the server's trust chain.
    ServerTrust,
    /// HTTP basic authentication.
    HttpBasic,
    /// Whatever the transport considers its default mechanism.
    Default,
}

/// The authentication context a challenge is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionSpace {
    /// Host the challenge originates from.
    pub host: String,
    /// Port the challenge originates from.
    pub port: u16,
    /// Authentication realm, when the protocol defines one.
    pub realm: Option<String>,
    /// The authentication method being requested.
    pub authentication_method: AuthenticationMethod,
}

impl ProtectionSpace {
    /// Create a protection space for a host/port pair.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        authentication_method: AuthenticationMethod,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            realm: None,
            authentication_method,
        }
    }
}

/// The capability to respond to a challenge at the transport layer.
///
/// The calling protocol supplies this; the broker uses it to register a
/// minted credential with the protection space, and the loader-style entry
/// point drives it directly from the emitted [`Disposition`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: dispositions are applied from
/// the broker's worker task, not the submitting thread.
pub trait ChallengeSender: Send + Sync {
    /// Associate the credential with the challenge's protection space.
    fn use_credential(&self, credential: &Credential);

    /// Let the transport fall back to its default handling.
    fn perform_default_handling(&self);

    /// Cancel the challenge outright.
    fn cancel(&self);
}

/// A request from a network/transport layer for proof of identity.
///
/// Owned by the calling protocol layer; the broker never retains a
/// challenge past its terminal disposition.
#[derive(Clone)]
pub struct Challenge {
    /// The authentication context the challenge was issued for.
    pub protection_space: ProtectionSpace,
    /// Responder capability supplied by the calling protocol.
    pub sender: Arc<dyn ChallengeSender>,
    /// Originating request URL, for logging only.
    pub url: Option<String>,
}

impl Challenge {
    /// Create a challenge for a protection space.
    pub fn new(protection_space: ProtectionSpace, sender: Arc<dyn ChallengeSender>) -> Self {
        Self {
            protection_space,
            sender,
            url: None,
        }
    }

    /// Attach the originating request URL for log context.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl std::fmt::Debug for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Challenge")
            .field("protection_space", &self.protection_space)
            .field("url", &self.url)
            .finish()
    }
}

/// The caller's decision on how to respond to a challenge.
///
/// Exactly one disposition is emitted per challenge. The enum is
/// non-exhaustive so the set can grow; consumers must treat an unknown
/// variant as [`Disposition::PerformDefaultHandling`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Disposition {
    /// Authenticate with the supplied credential.
    UseCredential(Credential),
    /// Defer to the transport's default behavior.
    PerformDefaultHandling,
    /// Cancel the challenge.
    CancelChallenge,
    /// Reject this protection space and try the next one, if any.
    RejectProtectionSpace,
}
