use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a content fingerprint.
const FINGERPRINT_BYTES: usize = 16;

/// Fingerprint of memory content: SHA-256 truncated to 16 bytes, lowercase hex.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest[..FINGERPRINT_BYTES]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
