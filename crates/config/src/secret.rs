//! Secret-bearing config values.
//!
//! A secret either holds cleartext alongside its keyed hash, or only the hash
//! (as rendered by `eject` or returned by the control plane). Text form is
//! `hash:<hex>`, so cleartext never leaves the process through serialization.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use std::fmt;
use supaconf_shared::{REDACTED, SecretString};

/// Prefix of a rendered secret hash.
pub const HASHED_PREFIX: &str = "hash:";

/// Prefix of an ECIES-encrypted secret value.
pub const ENCRYPTED_PREFIX: &str = "encrypted:";

/// A secret config value.
#[derive(Clone)]
pub enum Secret {
    /// Cleartext loaded from the config, environment, or decrypted source.
    Plain {
        /// The cleartext.
        value: SecretString,
        /// Hex HMAC-SHA256 of `value`; empty until sealed.
        sha256: String,
    },
    /// Only the hash is known.
    Hashed {
        /// Hex hash.
        sha256: String,
    },
}

impl Default for Secret {
    fn default() -> Self {
        Self::Plain {
            value: SecretString::default(),
            sha256: String::new(),
        }
    }
}

impl Secret {
    /// Wrap cleartext that has not been hashed yet.
    pub fn plain(value: impl Into<SecretString>) -> Self {
        Self::Plain {
            value: value.into(),
            sha256: String::new(),
        }
    }

    /// Build a hash-only secret.
    pub fn hashed(sha256: impl Into<String>) -> Self {
        Self::Hashed {
            sha256: sha256.into(),
        }
    }

    /// Cleartext, when known.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Plain { value, .. } => Some(value.expose()),
            Self::Hashed { .. } => None,
        }
    }

    /// Hex hash; empty when the secret is unset.
    #[must_use]
    pub fn sha256(&self) -> &str {
        match self {
            Self::Plain { sha256, .. } | Self::Hashed { sha256 } => sha256,
        }
    }

    /// Returns true when neither cleartext nor hash is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sha256().is_empty() && self.value().is_none_or(str::is_empty)
    }

    /// Returns true when the cleartext is known and hashed, so it may be pushed.
    #[must_use]
    pub fn is_pushable(&self) -> bool {
        matches!(self, Self::Plain { value, sha256 } if !value.is_empty() && !sha256.is_empty())
    }

    /// Replace the hash, keeping any cleartext.
    pub fn set_sha256(&mut self, hash: impl Into<String>) {
        match self {
            Self::Plain { sha256, .. } | Self::Hashed { sha256 } => *sha256 = hash.into(),
        }
    }

    /// Hash the cleartext with the installation key. Empty cleartext stays unhashed.
    pub fn seal(&mut self, key: &[u8]) {
        if let Self::Plain { value, sha256 } = self {
            *sha256 = if value.is_empty() {
                String::new()
            } else {
                hash_secret(key, value.expose())
            };
        }
    }
}

/// Hex HMAC-SHA256 of `value` keyed by `key`.
#[must_use]
pub fn hash_secret(key: &[u8], value: &str) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(key) else {
        return String::new();
    };
    mac.update(value.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.sha256() == other.sha256()
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain { sha256, .. } => formatter
                .debug_struct("Plain")
                .field("value", &REDACTED)
                .field("sha256", sha256)
                .finish(),
            Self::Hashed { sha256 } => formatter
                .debug_struct("Hashed")
                .field("sha256", sha256)
                .finish(),
        }
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sha256 = self.sha256();
        if sha256.is_empty() {
            Ok(())
        } else {
            write!(formatter, "{HASHED_PREFIX}{sha256}")
        }
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(match text.strip_prefix(HASHED_PREFIX) {
            Some(sha256) => Self::hashed(sha256),
            None => Self::plain(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_hash_or_empty() {
        let mut secret = Secret::plain("hunter2");
        assert_eq!(secret.to_string(), "");
        secret.seal(b"install");
        assert!(secret.to_string().starts_with(HASHED_PREFIX));
        assert!(!secret.to_string().contains("hunter2"));
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn parses_hash_prefix_as_hash_only() -> Result<(), toml::de::Error> {
        #[derive(Deserialize)]
        struct Doc {
            pass: Secret,
        }
        let doc: Doc = toml::from_str("pass = \"hash:abc\"")?;
        assert_eq!(doc.pass, Secret::hashed("abc"));
        assert!(doc.pass.value().is_none());
        let doc: Doc = toml::from_str("pass = \"plain\"")?;
        assert_eq!(doc.pass.value(), Some("plain"));
        Ok(())
    }

    #[test]
    fn equality_uses_hash_only() {
        let mut local = Secret::plain("value");
        local.seal(b"key");
        let remote = Secret::hashed(local.sha256());
        assert_eq!(local, remote);
        let mut other = Secret::plain("other");
        other.seal(b"key");
        assert_ne!(local, other);
    }

    #[test]
    fn installation_key_changes_hash() {
        assert_ne!(hash_secret(b"a", "value"), hash_secret(b"b", "value"));
        assert_eq!(hash_secret(b"a", "value").len(), 64);
    }

    #[test]
    fn set_sha256_keeps_cleartext() {
        let mut secret = Secret::plain("value");
        secret.seal(b"key");
        assert!(secret.is_pushable());
        secret.set_sha256("remote");
        assert_eq!(secret.value(), Some("value"));
        assert_eq!(secret.sha256(), "remote");
        assert!(Secret::default().is_empty());
        assert!(!Secret::hashed("x").is_pushable());
    }
}
