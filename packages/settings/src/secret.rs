// ABOUTME: Redacted, zeroized string wrapper for secrets
// ABOUTME: Provides constant-time comparison against caller-supplied credentials

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Secret value. There is no `==`; compare with [`SecretString::matches`].
///
/// ```compile_fail
/// use edgeapi_settings::SecretString;
///
/// let stored = SecretString::new("k1");
/// let _ = stored == SecretString::new("k1");
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw value. Never log or echo the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Compare `candidate` with the secret in constant time.
    ///
    /// Both sides are hashed first so the comparison length does not depend
    /// on either input.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = Sha256::digest(self.0.as_bytes());
        let provided = Sha256::digest(candidate.as_bytes());
        expected.as_slice().ct_eq(provided.as_slice()).into()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
