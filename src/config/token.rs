//! Shared-secret credential.
//!
//! The `TOKEN` environment variable is read once at startup and replaced
//! by its SHA-256 hex digest; the plaintext is not kept. Clients
//! authenticate by presenting the digest.

use std::fmt;

use sha2::{Digest, Sha256};

use super::ConfigError;

/// Environment variable holding the shared secret.
pub const TOKEN_ENV: &str = "TOKEN";

/// SHA-256 hex digest (64 lowercase hex chars) of the shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Digest a plaintext secret.
    pub fn from_secret(secret: &str) -> Self {
        Self(hex::encode(Sha256::digest(secret.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare a presented digest without early exit on the first mismatch.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.trim().as_bytes();
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Load and digest the `TOKEN` credential.
///
/// Fails with [`ConfigError::Missing`] when the variable is unset or empty.
pub fn load_token() -> Result<Token, ConfigError> {
    token_from(std::env::var(TOKEN_ENV).ok())
}

fn token_from(secret: Option<String>) -> Result<Token, ConfigError> {
    match secret.filter(|s| !s.is_empty()) {
        Some(secret) => Ok(Token::from_secret(&secret)),
        None => Err(ConfigError::Missing {
            key: TOKEN_ENV.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_missing_token() {
        let err = token_from(None).unwrap_err();
        assert!(err.is_missing());
        assert!(err.to_string().contains("TOKEN"));

        assert!(token_from(Some(String::new())).unwrap_err().is_missing());
    }

    #[test]
    fn test_token_digest_is_stable() {
        let first = token_from(Some("abc".to_string())).unwrap();
        let second = token_from(Some("abc".to_string())).unwrap();

        assert_eq!(first.as_str(), ABC_SHA256);
        assert_eq!(first.as_str().len(), 64);
        assert!(first.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(first, second);
        assert_ne!(first, Token::from_secret("abd"));
    }

    #[test]
    fn test_matches() {
        let token = Token::from_secret("abc");
        assert!(token.matches(ABC_SHA256));
        assert!(token.matches(&format!(" {}\n", ABC_SHA256)));
        assert!(!token.matches("abc"));
        assert!(!token.matches(""));
        assert!(!token.matches(&ABC_SHA256.replace('b', "c")));
    }

    #[test]
    fn test_debug_redacts_digest() {
        let token = Token::from_secret("abc");
        assert!(!format!("{:?}", token).contains(ABC_SHA256));
    }
}
