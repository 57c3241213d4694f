//! PKCS#12 container parsing.
//!
//! Decrypts a password-protected container blob into an [`Identity`]. The
//! cryptographic container format itself is delegated to the
//! `p12-keystore` primitive; this module only lowers what the primitive
//! yields into identity fields.
//!
//! Decryption can yield multiple items (a private-key chain plus loose
//! certificate bags). Each item is lowered to an [`ImportedItem`] field
//! map, and [`coalesce_items`] picks, per field, the value from the first
//! item that defines it. First match wins - fields are not merged across
//! items, and later items never override earlier ones.

use p12_keystore::{KeyStore, KeyStoreEntry};
use thiserror::Error;

use crate::cert::subject_common_name;
use crate::identity::{Identity, KeyIdentity, TrustObject};

/// Maximum container size (256KB holds any realistic client bundle).
pub const MAX_CONTAINER_SIZE: usize = 256 * 1024;

/// Errors that can occur while parsing a container.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The blob exceeds the container size cap.
    #[error("container too large: {0} bytes (max {MAX_CONTAINER_SIZE})")]
    TooLarge(usize),

    /// Wrong password, corrupt bytes, or an unsupported container format.
    /// Decryption is all-or-nothing; there is no partial success.
    #[error("container decryption failed: {0}")]
    DecryptionFailed(String),
}

/// One decrypted container item, lowered to optional identity fields.
///
/// Mirrors the shape the platform import primitive reports: a sequence of
/// dictionaries, each defining some subset of the identity fields.
#[derive(Debug, Clone, Default)]
pub(crate) struct ImportedItem {
    pub(crate) label: Option<String>,
    pub(crate) key_id: Option<Vec<u8>>,
    pub(crate) trust: Option<TrustObject>,
    pub(crate) cert_chain: Option<Vec<TrustObject>>,
    pub(crate) key_identity: Option<KeyIdentity>,
}

/// Parse a PKCS#12 container, decrypting with the given password.
///
/// Every call fully re-decrypts; there is no caching and no retry. The
/// password may be empty, but must match the container's encryption
/// password.
///
/// # Errors
///
/// Returns [`ParseError::DecryptionFailed`] for a wrong password, corrupt
/// bytes, or an unsupported format - never a partially-populated identity.
pub fn parse_pkcs12(data: &[u8], password: &str) -> Result<Identity, ParseError> {
    if data.len() > MAX_CONTAINER_SIZE {
        return Err(ParseError::TooLarge(data.len()));
    }

    let keystore = KeyStore::from_pkcs12(data, password)
        .map_err(|e| ParseError::DecryptionFailed(e.to_string()))?;

    let mut items = Vec::new();
    for (alias, entry) in keystore.entries() {
        items.push(lower_entry(alias, entry)?);
    }

    Ok(coalesce_items(&items))
}

/// Lower one keystore entry into an [`ImportedItem`].
fn lower_entry(alias: &str, entry: &KeyStoreEntry) -> Result<ImportedItem, ParseError> {
    match entry {
        KeyStoreEntry::PrivateKeyChain(chain) => {
            let certs: Vec<TrustObject> = chain
                .chain()
                .iter()
                .map(|cert| TrustObject::from_der(cert.as_der().to_vec()))
                .collect();

            let key_identity = match chain.chain().first() {
                Some(leaf) => Some(
                    KeyIdentity::new(chain.key().to_vec(), leaf.as_der().to_vec())
                        .map_err(|e| ParseError::DecryptionFailed(e.to_string()))?,
                ),
                // A keyed entry with no certificate cannot prove anything.
                None => None,
            };

            Ok(ImportedItem {
                label: entry_label(alias, chain.chain().first().map(|c| c.as_der())),
                key_id: non_empty(chain.local_key_id().to_vec()),
                trust: certs.first().cloned(),
                cert_chain: Some(certs),
                key_identity,
            })
        }
        KeyStoreEntry::Certificate(cert) => {
            let trust = TrustObject::from_der(cert.as_der().to_vec());
            Ok(ImportedItem {
                label: entry_label(alias, Some(cert.as_der())),
                key_id: None,
                trust: Some(trust.clone()),
                cert_chain: Some(vec![trust]),
                key_identity: None,
            })
        }
        #[allow(unreachable_patterns)]
        _ => Ok(ImportedItem::default()),
    }
}

/// Friendly name for an entry: the stored alias, falling back to the
/// certificate's subject CN when the container carries no name.
fn entry_label(alias: &str, leaf_der: Option<&[u8]>) -> Option<String> {
    if !alias.is_empty() {
        return Some(alias.to_string());
    }
    leaf_der.and_then(subject_common_name)
}

fn non_empty(bytes: Vec<u8>) -> Option<Vec<u8>> {
    if bytes.is_empty() {
        None
    } else {
        Some(bytes)
    }
}

/// Coalesce decrypted items into a single [`Identity`].
///
/// Per field, the value comes from the first item that defines it. This is
/// deliberately not a merge: if item 0 defines a label and item 1 defines
/// both a label and a key identity, the result carries item 0's label and
/// item 1's key identity.
pub(crate) fn coalesce_items(items: &[ImportedItem]) -> Identity {
    fn first<'a, T>(
        items: &'a [ImportedItem],
        field: impl Fn(&'a ImportedItem) -> Option<&'a T>,
    ) -> Option<&'a T> {
        items.iter().find_map(field)
    }

    Identity::new(
        first(items, |i| i.label.as_ref()).cloned(),
        first(items, |i| i.key_id.as_ref()).cloned(),
        first(items, |i| i.trust.as_ref()).cloned(),
        first(items, |i| i.cert_chain.as_ref()).cloned(),
        first(items, |i| i.key_identity.as_ref()).cloned(),
    )
}
