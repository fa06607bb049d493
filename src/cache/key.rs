//! Cache key generation using MD5 digests

use md5::{Digest, Md5};

/// Generate a deterministic cache key from a request's method, URL and body.
///
/// The digest input is `METHOD_URL`, followed by `_BODY` when a non-empty body
/// is present. Inputs are hashed byte for byte: URL casing, query parameter
/// order and whitespace are not normalized, so equivalent requests that are
/// serialized differently get different keys.
///
/// Returns 32 lowercase hexadecimal characters.
pub fn cache_key(method: &str, url: &str, body: Option<&[u8]>) -> String {
    let mut material = format!("{}_{}", method, url);

    if let Some(body) = body.filter(|b| !b.is_empty()) {
        material.push('_');
        material.push_str(&String::from_utf8_lossy(body));
    }

    let mut hasher = Md5::new();
    hasher.update(material.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_deterministic() {
        let key1 = cache_key("GET", "https://api.example/x", None);
        let key2 = cache_key("GET", "https://api.example/x", None);

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_cache_key_known_digest() {
        // md5("GET_https://api.example/x")
        assert_eq!(
            cache_key("GET", "https://api.example/x", None),
            "e8cd4a19739c12125514af3bc792d8a5"
        );
    }

    #[test]
    fn test_cache_key_format() {
        let key = cache_key("POST", "https://api.example/login", Some(b"user=a"));

        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_cache_key_empty_body_matches_no_body() {
        let key1 = cache_key("GET", "https://api.example/x", None);
        let key2 = cache_key("GET", "https://api.example/x", Some(b""));

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_cache_key_different_methods() {
        let key1 = cache_key("GET", "https://api.example/x", None);
        let key2 = cache_key("POST", "https://api.example/x", None);

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_cache_key_different_urls() {
        let key1 = cache_key("GET", "https://api.example/x?a=1&b=2", None);
        let key2 = cache_key("GET", "https://api.example/x?b=2&a=1", None);

        // No query normalization
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_cache_key_different_bodies() {
        let key1 = cache_key("POST", "https://api.example/x", Some(b"{\"page\":1}"));
        let key2 = cache_key("POST", "https://api.example/x", Some(b"{\"page\":2}"));

        assert_ne!(key1, key2);
    }
}
