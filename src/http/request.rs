//! Extraction of routing inputs from an inbound request.
//!
//! # Responsibilities
//! - Resolve the request host, preferring `X-Forwarded-Host`
//! - Preserve the request's path-and-query verbatim for the redirect target
//!
//! # Design Decisions
//! - The host is used exactly as received: no lowercasing, port stripping
//!   or trailing-dot removal
//! - An empty `X-Forwarded-Host` counts as absent

use axum::http::{header, HeaderMap, Uri};

/// Header set by upstream proxies carrying the client-facing host.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// The two values the redirect handler needs from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub host: String,
    pub path_and_query: String,
}

impl RequestTarget {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        Self {
            host: request_host(headers, uri).unwrap_or_default().to_string(),
            path_and_query: uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/")
                .to_string(),
        }
    }
}

/// Forwarded host, else `Host` header, else the URI authority (HTTP/2).
pub fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };

    header_value(X_FORWARDED_HOST)
        .or_else(|| header_value(header::HOST.as_str()))
        .or_else(|| uri.authority().map(|a| a.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_forwarded_host_wins() {
        let h = headers(&[("host", "internal.lb"), ("x-forwarded-host", "old.example.com")]);
        let target = RequestTarget::from_parts(&h, &Uri::from_static("/foo?x=1"));
        assert_eq!(target.host, "old.example.com");
        assert_eq!(target.path_and_query, "/foo?x=1");
    }

    #[test]
    fn test_falls_back_to_host_header() {
        let h = headers(&[("host", "old.example.com")]);
        assert_eq!(request_host(&h, &Uri::from_static("/")), Some("old.example.com"));

        let h = headers(&[("host", "old.example.com"), ("x-forwarded-host", "")]);
        assert_eq!(request_host(&h, &Uri::from_static("/")), Some("old.example.com"));
    }

    #[test]
    fn test_falls_back_to_authority() {
        let uri = Uri::from_static("https://old.example.com/path");
        assert_eq!(request_host(&HeaderMap::new(), &uri), Some("old.example.com"));
    }

    #[test]
    fn test_host_kept_verbatim() {
        let h = headers(&[("host", "Old.Example.com:8080")]);
        let target = RequestTarget::from_parts(&h, &Uri::from_static("/"));
        assert_eq!(target.host, "Old.Example.com:8080");
    }

    #[test]
    fn test_missing_host_is_empty() {
        let target = RequestTarget::from_parts(&HeaderMap::new(), &Uri::from_static("/a"));
        assert_eq!(target.host, "");
        assert_eq!(target.path_and_query, "/a");
    }
}
