//! Byte providers: where container bytes come from.
//!
//! The broker does not care whether the container lives in a bundled
//! resource directory or somewhere else entirely; it only needs something
//! that can produce the bytes. Providers must fail closed: a missing or
//! unreadable resource is a logged `None`, never a panic at challenge
//! time.
//!
//! The one exception is a *remote* container location. That is a
//! configuration error, and it is rejected fatally at construction time
//! rather than routed through the per-challenge decline path.

use std::path::{Path, PathBuf};

use crate::config::ContainerConfig;

/// Source of raw certificate-container bytes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the broker's worker task calls
/// `resolve` for every challenge.
pub trait ByteProvider: Send + Sync {
    /// Produce the container bytes, or `None` if the resource cannot be
    /// located or read. Called once per challenge; results are never
    /// cached by the broker.
    fn resolve(&self) -> Option<Vec<u8>>;
}

/// File-backed provider: looks up `{resource_name}.{extension}` from the
/// configuration inside a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    path: PathBuf,
}

impl DirectoryProvider {
    /// Create a provider rooted at `location`.
    ///
    /// `location` is a directory path, optionally in `file://` form.
    ///
    /// # Panics
    ///
    /// Panics if `location` carries a non-`file` URL scheme. A remote
    /// container is an unrecoverable configuration error: failing at
    /// startup is the contract, not a runtime decline.
    pub fn new(location: &str, config: &ContainerConfig) -> Self {
        let root = match location.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => {
                tracing::error!(scheme, location, "remote certificate containers are not supported");
                panic!("remote certificate containers are not supported (location: {location})");
            }
            None => location,
        };

        let file_name = format!("{}.{}", config.resource_name(), config.extension());
        Self {
            path: Path::new(root).join(file_name),
        }
    }

    /// The resolved container path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteProvider for DirectoryProvider {
    fn resolve(&self) -> Option<Vec<u8>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "certificate container missing or unreadable"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ContainerConfig {
        ContainerConfig::new("client", "gatekeeper-test").with_extension("p12")
    }

    #[test]
    fn resolves_container_from_directory() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../gatekeeper-auth/testdata");
        let provider = DirectoryProvider::new(dir, &test_config());
        let bytes = provider.resolve().expect("fixture exists");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn accepts_file_url_form() {
        let dir = format!(
            "file://{}/../gatekeeper-auth/testdata",
            env!("CARGO_MANIFEST_DIR")
        );
        let provider = DirectoryProvider::new(&dir, &test_config());
        assert!(provider.resolve().is_some());
    }

    #[test]
    fn missing_container_fails_closed() {
        let provider = DirectoryProvider::new("/nonexistent-dir", &test_config());
        assert!(provider.resolve().is_none());
    }

    #[test]
    #[should_panic(expected = "remote certificate containers are not supported")]
    fn remote_location_is_fatal_at_construction() {
        let _ = DirectoryProvider::new("https://example.com/certs", &test_config());
    }
}
