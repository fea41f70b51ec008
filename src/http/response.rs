//! Response construction.
//!
//! # Responsibilities
//! - Redirect: rule status + `Location`, with a short HTML body for GET/HEAD
//! - Not found: plain-text 404
//! - Liveness: empty 200
//!
//! # Design Decisions
//! - The rule's status code is used as configured, even if it is not a
//!   redirect code
//! - A rule that cannot be turned into a valid response (unrepresentable
//!   status, control characters in the target) yields a 500 and an error log

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::schema::Rule;

const TEXT_HTML: &str = "text/html; charset=utf-8";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Build the redirect response for a matched rule.
pub fn redirect(rule: &Rule, path_and_query: &str, method: &Method) -> Response {
    let target = rule.target(path_and_query);

    let status = match u16::try_from(rule.status).ok().and_then(|s| StatusCode::from_u16(s).ok()) {
        Some(status) => status,
        None => {
            tracing::error!(from = %rule.from, status = rule.status, "Rule has an unrepresentable status code");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let location = match HeaderValue::try_from(target.as_str()) {
        Ok(location) => location,
        Err(_) => {
            tracing::error!(from = %rule.from, target = %target, "Redirect target is not a valid header value");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response = if *method == Method::GET || *method == Method::HEAD {
        let body = format!(
            "<a href=\"{}\">{}</a>.\n\n",
            html_escape(&target),
            status.canonical_reason().unwrap_or("Redirect")
        );
        let mut response = Response::new(Body::from(body));
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_HTML));
        response
    } else {
        Response::new(Body::empty())
    };

    *response.status_mut() = status;
    response.headers_mut().insert(header::LOCATION, location);
    response
}

/// Plain-text 404 for hosts with no rule.
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [
            (header::CONTENT_TYPE, TEXT_PLAIN),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        "404 page not found\n",
    )
        .into_response()
}

/// Liveness probe response.
pub fn healthy() -> Response {
    StatusCode::OK.into_response()
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
