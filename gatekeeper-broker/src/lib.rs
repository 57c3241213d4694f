//! Serialized client-certificate challenge broker.
//!
//! When a TLS-speaking transport asks the process to prove its identity,
//! something has to open the configured PKCS#12 container, mint a
//! credential, and answer - exactly once, without racing other challenges
//! that may arrive at the same moment from other call sites (a generic
//! network session, a media-resource loader). That something is the
//! [`ChallengeBroker`].
//!
//! ## Shape
//!
//! - [`ChallengeBroker`] - one worker task, strict submission order,
//!   exactly one [`Disposition`] per [`Challenge`]
//! - [`ByteProvider`] / [`DirectoryProvider`] - where container bytes
//!   come from; fails closed on missing resources, fails fast at startup
//!   on remote ones
//! - [`ContainerConfig`] - immutable container description (name,
//!   extension, format, password)
//!
//! Parsing and credential types live in `gatekeeper-auth`; this crate owns
//! the protocol/state semantics.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gatekeeper_broker::{
//!     ChallengeBroker, ContainerConfig, DirectoryProvider,
//! };
//!
//! let config = ContainerConfig::new("client", "hunter2");
//! let provider = Arc::new(DirectoryProvider::new("/etc/myapp/certs", &config));
//! let broker = ChallengeBroker::new(config, provider);
//!
//! broker.handle_challenge(challenge, |disposition| {
//!     // feed the disposition back to the transport
//! });
//! ```

mod broker;
mod challenge;
mod config;
mod provider;

pub use broker::ChallengeBroker;
pub use challenge::{
    AuthenticationMethod, Challenge, ChallengeSender, Disposition, ProtectionSpace,
};
pub use config::{ContainerConfig, ContainerFormat};
pub use provider::{ByteProvider, DirectoryProvider};

// Re-export the credential types callers see in dispositions.
pub use gatekeeper_auth::{Credential, Fingerprint, Persistence};
