use axum::http::HeaderMap;
use std::borrow::Cow;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const REAL_IP: &str = "x-real-ip";
pub const SESSION_ID: &str = "x-session-id";

const UNKNOWN: &str = "unknown";

// Non-empty header value; bytes outside UTF-8 are replaced, not discarded
fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    let raw = String::from_utf8_lossy(headers.get(name)?.as_bytes());
    let trimmed = match raw {
        Cow::Borrowed(v) => Cow::Borrowed(v.trim()),
        Cow::Owned(v) => Cow::Owned(v.trim().to_string()),
    };
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Builds the quota key for a request as `ip_session`.
///
/// The ip comes from `x-forwarded-for`, then `x-real-ip`, then `"unknown"`.
/// Without `x-session-id` the ip doubles as the session part, so a request
/// with no identifying headers lands in the shared `unknown_unknown` bucket.
pub fn resolve_identifier(headers: &HeaderMap) -> String {
    let ip = header(headers, FORWARDED_FOR)
        .or_else(|| header(headers, REAL_IP))
        .unwrap_or(Cow::Borrowed(UNKNOWN));
    let session = header(headers, SESSION_ID).unwrap_or_else(|| ip.clone());

    format!("{ip}_{session}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn no_headers_share_unknown_bucket() {
        assert_eq!(resolve_identifier(&HeaderMap::new()), "unknown_unknown");
    }

    #[test]
    fn forwarded_for_wins_over_real_ip() {
        let map = headers(&[(FORWARDED_FOR, "10.0.0.1"), (REAL_IP, "10.0.0.2")]);
        assert_eq!(resolve_identifier(&map), "10.0.0.1_10.0.0.1");
    }

    #[test]
    fn real_ip_is_fallback() {
        let map = headers(&[(REAL_IP, "10.0.0.2"), (SESSION_ID, "sess-1")]);
        assert_eq!(resolve_identifier(&map), "10.0.0.2_sess-1");
    }

    #[test]
    fn session_without_ip() {
        let map = headers(&[(SESSION_ID, "sess-1")]);
        assert_eq!(resolve_identifier(&map), "unknown_sess-1");
    }

    #[test]
    fn blank_headers_count_as_missing() {
        let map = headers(&[(FORWARDED_FOR, "  "), (REAL_IP, "10.0.0.2"), (SESSION_ID, "")]);
        assert_eq!(resolve_identifier(&map), "10.0.0.2_10.0.0.2");
    }

    #[test]
    fn forwarded_chain_is_kept_verbatim() {
        let map = headers(&[(FORWARDED_FOR, "203.0.113.7, 10.0.0.1")]);
        assert_eq!(resolve_identifier(&map), "203.0.113.7, 10.0.0.1_203.0.113.7, 10.0.0.1");
    }

    #[test]
    fn non_ascii_values_are_kept_not_dropped() {
        let mut map = HeaderMap::new();
        map.insert(FORWARDED_FOR, HeaderValue::from_static("10.0.0.1"));
        map.insert(SESSION_ID, HeaderValue::from_bytes(b"caf\xe9-42").unwrap());

        assert_eq!(resolve_identifier(&map), "10.0.0.1_caf\u{fffd}-42");

        let mut map = HeaderMap::new();
        map.insert(FORWARDED_FOR, HeaderValue::from_bytes(b"\xff10.0.0.9").unwrap());
        map.insert(REAL_IP, HeaderValue::from_static("10.0.0.2"));

        assert_eq!(resolve_identifier(&map), "\u{fffd}10.0.0.9_\u{fffd}10.0.0.9");
    }
}
