//! Key encoding utilities.
//!
//! Keys are free-form strings at the trait level. Backends that map keys onto
//! something more restrictive (file names) use [`file_name`].

/// Prefix for cached API responses.
pub const CACHE_PREFIX: &str = "api_cache_";

/// Build the cache key for an endpoint path (including its query string).
///
/// Every character that is not ASCII alphanumeric becomes `_`, so the key is
/// stable across backends.
#[must_use]
pub fn cache_key(path: &str) -> String {
    let mut key = String::with_capacity(CACHE_PREFIX.len() + path.len());
    key.push_str(CACHE_PREFIX);
    key.extend(
        path.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    key
}

/// Encode an arbitrary key as a portable file name.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes
/// `%XX`. The mapping is injective, so distinct keys never share a file.
#[must_use]
pub fn file_name(key: &str) -> String {
    use std::fmt::Write;

    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(char::from(byte));
        } else {
            write!(&mut name, "%{byte:02X}").ok();
        }
    }
    name
}
