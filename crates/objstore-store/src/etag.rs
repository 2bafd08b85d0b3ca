/// Domain-separated BLAKE3 hasher producing object ETags.
///
/// The domain tag is prepended to every computation, so an ETag never
/// collides with a hash of the same bytes taken for another purpose.
pub struct EtagHasher {
    domain: &'static str,
}

impl EtagHasher {
    /// Hasher for object bodies.
    pub const BODY: Self = Self {
        domain: "objstore-etag-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Lowercase hex ETag for `body`.
    pub fn etag(&self, body: &[u8]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(body);
        hasher.finalize().to_hex().to_string()
    }

    /// Check that `body` hashes to `expected`.
    pub fn verify(&self, body: &[u8], expected: &str) -> bool {
        self.etag(body) == expected
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_deterministic() {
        assert_eq!(EtagHasher::BODY.etag(b"hello"), EtagHasher::BODY.etag(b"hello"));
    }

    #[test]
    fn etag_is_hex() {
        let tag = EtagHasher::BODY.etag(b"x");
        assert_eq!(tag.len(), 64);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_bodies_differ() {
        assert_ne!(EtagHasher::BODY.etag(b"a"), EtagHasher::BODY.etag(b"b"));
    }

    #[test]
    fn domain_separates() {
        let other = EtagHasher::new("other-v1");
        assert_ne!(other.etag(b"a"), EtagHasher::BODY.etag(b"a"));
        assert_eq!(other.domain(), "other-v1");
    }

    #[test]
    fn verify_detects_tampering() {
        let tag = EtagHasher::BODY.etag(b"original");
        assert!(EtagHasher::BODY.verify(b"original", &tag));
        assert!(!EtagHasher::BODY.verify(b"tampered", &tag));
    }
}
