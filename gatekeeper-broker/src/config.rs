//! Broker configuration: which container to open, and how.

use zeroize::Zeroizing;

/// Supported certificate container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ContainerFormat {
    /// A PKCS#12 (.p12/.pfx) bundle.
    #[default]
    Pkcs12,
}

/// Immutable description of the certificate container, supplied at broker
/// construction.
///
/// The password lives in a `Zeroizing<String>` so it is erased from memory
/// when the configuration is dropped.
#[derive(Clone)]
pub struct ContainerConfig {
    format: ContainerFormat,
    resource_name: String,
    extension: String,
    password: Zeroizing<String>,
}

impl ContainerConfig {
    /// Describe a container by resource name and decryption password.
    ///
    /// Defaults: PKCS#12 format, `pfx` extension.
    pub fn new(resource_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            format: ContainerFormat::Pkcs12,
            resource_name: resource_name.into(),
            extension: "pfx".to_string(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Override the container format.
    #[must_use]
    pub fn with_format(mut self, format: ContainerFormat) -> Self {
        self.format = format;
        self
    }

    /// Override the file extension (default `pfx`).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The container format.
    #[must_use]
    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    /// The container's resource name, without extension.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The container's file extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for ContainerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerConfig")
            .field("format", &self.format)
            .field("resource_name", &self.resource_name)
            .field("extension", &self.extension)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pkcs12_and_pfx() {
        let config = ContainerConfig::new("client", "secret");
        assert_eq!(config.format(), ContainerFormat::Pkcs12);
        assert_eq!(config.resource_name(), "client");
        assert_eq!(config.extension(), "pfx");
        assert_eq!(config.password(), "secret");
    }

    #[test]
    fn extension_can_be_overridden() {
        let config = ContainerConfig::new("client", "secret").with_extension("p12");
        assert_eq!(config.extension(), "p12");
    }

    #[test]
    fn debug_does_not_print_the_password() {
        let config = ContainerConfig::new("client", "hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
