/// Stable identity for job listings seen across providers and keywords.
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a UTF-8 string.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity key of a listing: SHA-256 of `title::company::location`, each part
/// trimmed and lower-cased.
///
/// Two listings whose normalized triples are equal collapse to one key no
/// matter which provider produced them.
pub fn job_key(title: &str, company: &str, location: &str) -> String {
    let base = format!(
        "{}::{}::{}",
        title.trim().to_lowercase(),
        company.trim().to_lowercase(),
        location.trim().to_lowercase()
    );
    hash_text(&base)
}
