//! Pastes: the resources access decisions are made about

use std::fmt;

use crate::clock::unix_now;
use crate::identity::IdentityId;

/// Number of random bytes behind a paste key
const KEY_LEN: usize = 8;

/// Short opaque paste identifier (base58)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PasteKey(String);

impl PasteKey {
    /// Fresh random key
    pub fn generate() -> Self {
        let bytes: [u8; KEY_LEN] = rand::random();
        Self(bs58::encode(bytes).into_string())
    }

    /// Accept a key received from a client
    ///
    /// Only non-empty base58 strings of plausible length are accepted, so a
    /// key is always safe to use as a file name.
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 32 {
            return None;
        }
        bs58::decode(s).into_vec().ok()?;
        Some(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasteKey({})", self.0)
    }
}

impl fmt::Display for PasteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PasteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Who may read a paste without being the owner or a grantee
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Readable by anyone, including unauthenticated callers
    Public,
    /// Readable by the owner and grantees only
    Private,
}

impl Visibility {
    /// At-rest discriminator
    pub fn code(&self) -> i64 {
        match self {
            Visibility::Public => 0,
            Visibility::Private => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Visibility::Public),
            1 => Some(Visibility::Private),
            _ => None,
        }
    }

    /// Accepts the numeric codes as well as the names
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "0" | "public" => Some(Visibility::Public),
            "1" | "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Paste metadata; content lives in blob storage under the same key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paste {
    pub key: PasteKey,
    pub title: String,
    pub owner: IdentityId,
    pub visibility: Visibility,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Paste {
    pub fn new(title: impl Into<String>, owner: IdentityId, visibility: Visibility) -> Self {
        let now = unix_now();
        Self {
            key: PasteKey::generate(),
            title: title.into(),
            owner,
            visibility,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, identity: &IdentityId) -> bool {
        self.owner == *identity
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_parse() {
        let key = PasteKey::generate();
        assert_eq!(PasteKey::parse(key.as_str()), Some(key.clone()));
        assert_ne!(key, PasteKey::generate());
    }

    #[test]
    fn test_key_rejects_path_characters() {
        assert!(PasteKey::parse("").is_none());
        assert!(PasteKey::parse("../etc").is_none());
        assert!(PasteKey::parse("abc/def").is_none());
        // 0, O, I and l are outside the base58 alphabet
        assert!(PasteKey::parse("0OIl").is_none());
        assert!(PasteKey::parse(&"z".repeat(33)).is_none());
    }

    #[test]
    fn test_visibility_codes() {
        assert_eq!(Visibility::from_code(0), Some(Visibility::Public));
        assert_eq!(Visibility::from_code(1), Some(Visibility::Private));
        assert_eq!(Visibility::from_code(2), None);

        assert_eq!(Visibility::parse("private"), Some(Visibility::Private));
        assert_eq!(Visibility::parse(" 0 "), Some(Visibility::Public));
        assert_eq!(Visibility::parse("secret"), None);
    }
}
