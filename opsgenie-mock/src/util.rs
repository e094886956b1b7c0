use hyper::{header::HeaderName, HeaderMap};

/// Returns the first value of `header_name` as sent, or an empty string when the header is
/// missing. Bytes that aren't valid UTF-8 are replaced with `U+FFFD`.
pub fn header_value(header_map: &HeaderMap, header_name: HeaderName) -> String {
    header_map
        .get(header_name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}
