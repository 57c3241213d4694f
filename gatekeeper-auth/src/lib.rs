#![forbid(unsafe_code)]

//! Pure client-certificate parsing and credential types for Gatekeeper.
//!
//! This crate is intentionally IO-free:
//! - No filesystem operations
//! - No network calls
//! - No logging
//!
//! It turns the raw bytes of a password-protected certificate container
//! (PKCS#12) into an [`Identity`], and an `Identity` into a session-scoped
//! [`Credential`] ready to be presented during a TLS handshake. Where the
//! container bytes come from, and when parsing happens, is the caller's
//! concern (see `gatekeeper-broker`).
//!
//! # Example
//!
//! ```ignore
//! use gatekeeper_auth::parse_pkcs12;
//!
//! let identity = parse_pkcs12(&container_bytes, "hunter2")?;
//! let credential = identity.to_credential().expect("container had a private key");
//! ```

pub mod cert;
pub mod container;
pub mod credential;
pub mod identity;

pub use cert::{extract_public_key_from_cert, CertError};
pub use container::{parse_pkcs12, ParseError};
pub use credential::{Credential, Persistence};
pub use identity::{Fingerprint, Identity, KeyIdentity, TrustObject};
