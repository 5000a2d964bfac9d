//! Credential normalization.
//!
//! A [`Credential`] only lives long enough to be turned into a [`LookupKey`]. [`normalize`] takes
//! it by value, so the raw secret is dropped (and its memory wiped) before the function returns.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::error::{InvalidCredentialError, InvalidLookupKeyError};

/// Length of the uppercase hex SHA-1 digest stored in a [`LookupKey`].
pub const HASH_HEX_LEN: usize = 40;

/// Prefix length used when a [`LookupKey`] is displayed.
const DISPLAY_PREFIX_LEN: usize = 5;

/// The kind of credential being checked. Corpora differ per kind, so this is also the namespace
/// sent to the corpus provider.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// An email address.
    Email,
    /// A password.
    Password,
}

impl CredentialKind {
    /// Namespace used on the wire.
    pub fn namespace(&self) -> &'static str {
        match self {
            CredentialKind::Email => "email",
            CredentialKind::Password => "password",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// A credential submitted by the user.
///
/// The value is zeroized on drop and never printed, not even by `Debug`.
pub enum Credential {
    #[allow(missing_docs)]
    Email(Zeroizing<String>),
    #[allow(missing_docs)]
    Password(Zeroizing<String>),
}

impl Credential {
    /// Wrap an email address.
    pub fn email(value: impl Into<String>) -> Self {
        Credential::Email(Zeroizing::new(value.into()))
    }

    /// Wrap a password.
    pub fn password(value: impl Into<String>) -> Self {
        Credential::Password(Zeroizing::new(value.into()))
    }

    /// Build a credential from its kind and value.
    pub fn new(kind: CredentialKind, value: impl Into<String>) -> Self {
        match kind {
            CredentialKind::Email => Self::email(value),
            CredentialKind::Password => Self::password(value),
        }
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::Email(_) => CredentialKind::Email,
            Credential::Password(_) => CredentialKind::Password,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// One-way identifier of a credential, used as the cache key and to derive corpus queries.
///
/// Two equal credentials always produce the same key. The kind is part of the key, so an email
/// and a password with the same text never collide.
///
/// Deserialization only accepts a full hex digest, which is stored uppercase.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "RawLookupKey")]
pub struct LookupKey {
    kind: CredentialKind,
    hash: String,
}

#[derive(Deserialize)]
struct RawLookupKey {
    kind: CredentialKind,
    hash: String,
}

impl TryFrom<RawLookupKey> for LookupKey {
    type Error = InvalidLookupKeyError;

    fn try_from(raw: RawLookupKey) -> Result<Self, Self::Error> {
        if raw.hash.len() != HASH_HEX_LEN || !raw.hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidLookupKeyError);
        }
        Ok(Self {
            kind: raw.kind,
            hash: raw.hash.to_ascii_uppercase(),
        })
    }
}

impl LookupKey {
    fn derive(kind: CredentialKind, canonical: &str) -> Self {
        let digest = Sha1::digest(canonical.as_bytes());
        Self {
            kind,
            hash: format!("{:X}", digest),
        }
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// Full uppercase hex digest. Never transmitted to the corpus provider.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Split the digest into `(prefix, suffix)`. The length is clamped to the digest length.
    pub fn split(&self, prefix_len: usize) -> (&str, &str) {
        // The digest is ASCII hex (checked on deserialization), so any index is a char boundary.
        self.hash.split_at(prefix_len.min(self.hash.len()))
    }

    /// The first `len` hex characters of the digest.
    pub fn prefix(&self, len: usize) -> &str {
        self.split(len).0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}…", self.kind, self.prefix(DISPLAY_PREFIX_LEN))
    }
}

impl fmt::Debug for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupKey")
            .field("kind", &self.kind)
            .field("prefix", &self.prefix(DISPLAY_PREFIX_LEN))
            .finish()
    }
}

/// Canonicalize a credential into its [`LookupKey`].
///
/// Emails are trimmed and lowercased, and must contain a non-empty local part and domain around
/// the last `@`. Passwords are hashed exactly as entered but must contain a non-whitespace
/// character.
pub fn normalize(credential: Credential) -> Result<LookupKey, InvalidCredentialError> {
    match credential {
        Credential::Email(value) => {
            let canonical = canonical_email(&value)?;
            Ok(LookupKey::derive(CredentialKind::Email, &canonical))
        }
        Credential::Password(value) => {
            if value.trim().is_empty() {
                return Err(InvalidCredentialError::Empty(CredentialKind::Password));
            }
            Ok(LookupKey::derive(CredentialKind::Password, &value))
        }
    }
}

fn canonical_email(value: &str) -> Result<Zeroizing<String>, InvalidCredentialError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InvalidCredentialError::Empty(CredentialKind::Email));
    }

    let canonical = Zeroizing::new(trimmed.to_lowercase());
    let well_formed = canonical
        .rsplit_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(InvalidCredentialError::MalformedEmail);
    }

    Ok(canonical)
}
