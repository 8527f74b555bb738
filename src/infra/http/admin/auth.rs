//! Privilege and anti-forgery checks for the admin surface.
//!
//! Both failure modes terminate the request with a fatal denial and leave
//! all state unchanged. Token comparison is constant-time.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::application::error::ErrorReport;

use super::AdminState;

const COOKIE_NAME: &str = "riserva_admin";

/// Middleware gating the whole admin router behind the elevated-privilege
/// token, accepted as a bearer header or a session cookie.
pub async fn require_privilege(
    State(state): State<AdminState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let presented = bearer_token(&request).or_else(|| cookie_token(&request));

    match presented {
        Some(token) if tokens_match(&token, &state.admin_token) => next.run(request).await,
        _ => denied("insufficient privilege for admin surface"),
    }
}

/// Check a submitted anti-forgery token against the state's token.
pub fn verify_forgery_token(state: &AdminState, submitted: &str) -> Result<(), Response> {
    if tokens_match(submitted, &state.forgery_token) {
        Ok(())
    } else {
        Err(denied("anti-forgery token mismatch"))
    }
}

fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();
    presented.len() == expected.len() && presented.ct_eq(expected).into()
}

fn bearer_token(request: &Request<Body>) -> Option<String> {
    let raw = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(|s| s.to_string())
}

fn cookie_token(request: &Request<Body>) -> Option<String> {
    let raw = request.headers().get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == COOKIE_NAME).then(|| value.to_string())
    })
}

fn denied(detail: &'static str) -> Response {
    let mut response = (StatusCode::FORBIDDEN, "Access denied").into_response();
    ErrorReport::from_message("infra::http::admin::auth", StatusCode::FORBIDDEN, detail)
        .attach(&mut response);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_match_requires_exact_value() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc124", "abc123"));
        assert!(!tokens_match("abc12", "abc123"));
        assert!(!tokens_match("", "abc123"));
    }

    #[test]
    fn cookie_parsing_finds_admin_cookie() {
        let request = Request::builder()
            .header(header::COOKIE, "theme=dark; riserva_admin=tok; lang=en")
            .body(Body::empty())
            .expect("request");
        assert_eq!(cookie_token(&request), Some("tok".to_string()));
    }

    #[test]
    fn bearer_parsing_strips_scheme() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer tok")
            .body(Body::empty())
            .expect("request");
        assert_eq!(bearer_token(&request), Some("tok".to_string()));
    }
}
