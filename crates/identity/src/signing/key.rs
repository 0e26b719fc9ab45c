use std::fmt;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("signing key is empty")]
    Empty,
    #[error("failed to read signing key file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared HMAC secret.
///
/// Never empty: an empty secret is treated as "no key" everywhere, so it is
/// refused at construction. `Debug` does not print the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(bytes))
    }

    /// Loads a key from a file, dropping one trailing line ending.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let mut bytes = std::fs::read(path).map_err(|source| KeyError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        if bytes.ends_with(b"\r\n") {
            bytes.truncate(bytes.len() - 2);
        } else if bytes.ends_with(b"\n") {
            bytes.truncate(bytes.len() - 1);
        }

        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// Source of the current signing key.
///
/// The handler asks for the key on every request and never caches it, so
/// an implementation backed by a secret store stays authoritative.
pub trait KeyProvider: Send + Sync {
    fn signing_key(&self) -> &SigningKey;
}

/// Key fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct StaticKey(SigningKey);

impl StaticKey {
    pub fn new(key: SigningKey) -> Self {
        Self(key)
    }
}

impl KeyProvider for StaticKey {
    fn signing_key(&self) -> &SigningKey {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(SigningKey::new(Vec::<u8>::new()), Err(KeyError::Empty)));
        assert!(matches!(SigningKey::new(""), Err(KeyError::Empty)));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let key = SigningKey::new("ThisIsATest").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("ThisIsATest"));
        assert!(debug.contains("len: 11"));
    }

    #[test]
    fn static_provider_returns_its_key() {
        let key = SigningKey::new("ThisIsATest").unwrap();
        let provider = StaticKey::new(key.clone());
        assert_eq!(provider.signing_key(), &key);
    }

    #[test]
    fn key_file_trailing_newline_is_stripped() {
        let path = std::env::temp_dir().join(format!(
            "signed-identity-key-{}-newline",
            std::process::id()
        ));
        std::fs::write(&path, "ThisIsATest\r\n").unwrap();

        let key = SigningKey::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(key.as_bytes(), b"ThisIsATest");
    }

    #[test]
    fn key_file_with_only_newline_is_empty() {
        let path = std::env::temp_dir().join(format!(
            "signed-identity-key-{}-blank",
            std::process::id()
        ));
        std::fs::write(&path, "\n").unwrap();

        let result = SigningKey::from_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(KeyError::Empty)));
    }

    #[test]
    fn missing_key_file_is_unreadable() {
        let result = SigningKey::from_file("/nonexistent/signed-identity/key");
        assert!(matches!(result, Err(KeyError::Unreadable { .. })));
    }
}
