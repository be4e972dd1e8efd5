//! Short ID derivation
//!
//! A short ID is the first 8 hex characters of the MD5 digest of the original URL.
//! The digest is only a deterministic key generator: two different URLs may map to
//! the same ID, and the stores keep whichever mapping was written first.

/// Length of every short ID, in characters
pub const ID_LEN: usize = 8;

/// Derives the short ID for a URL
///
/// Any string is accepted; no URL validation happens here.
///
/// # Example
///
/// ```
/// # use digestlink::digest::derive_id;
/// assert_eq!(derive_id("https://example.com"), "c984d06a");
/// ```
pub fn derive_id(original_url: &str) -> String {
    let digest = md5::compute(original_url.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(ID_LEN);
    hex
}

/// Returns true if `id` could have been produced by [`derive_id`]
pub fn is_well_formed_id(id: &str) -> bool {
    id.len() == ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
