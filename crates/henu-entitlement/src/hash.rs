//! Credential digests.

use sha2::{Digest, Sha224};

/// Compute the SHA-224 digest of a secret as lowercase hex.
///
/// Static identity tables store only digests of tokens and passwords.
///
/// # Example
/// ```
/// use henu_entitlement::digest_hex;
///
/// let digest = digest_hex("session-token");
/// assert_eq!(digest.len(), 56);
/// ```
#[inline]
pub fn digest_hex(secret: &str) -> String {
    hex::encode(Sha224::digest(secret.as_bytes()))
}

/// Check a plaintext secret against a stored digest.
#[inline]
pub fn digest_matches(secret: &str, digest: &str) -> bool {
    digest_hex(secret).eq_ignore_ascii_case(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_shape() {
        let digest = digest_hex("token");
        assert_eq!(digest.len(), 56);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_matches() {
        let digest = digest_hex("hunter2");
        assert!(digest_matches("hunter2", &digest));
        assert!(digest_matches("hunter2", &digest.to_uppercase()));
        assert!(!digest_matches("hunter3", &digest));
    }
}
