//! Session cookie directives.
//!
//! Pure functions over [`CookiePolicy`]. Nothing in here reads ambient
//! configuration; the `Secure` flag arrives through the policy value.

use axum::http::{HeaderMap, header};
use cookie::Cookie;
use cookie::time::Duration;

use doorkeep_auth::SESSION_TTL_MS;
use doorkeep_core::Environment;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// Sentinel written into the cookie when it is being cleared.
const CLEARED_VALUE: &str = "invalid";

/// Per-environment cookie attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
}

impl CookiePolicy {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            secure: environment.is_production(),
        }
    }

    pub fn secure(self) -> bool {
        self.secure
    }
}

/// `Set-Cookie` value installing `token` site-wide for the session TTL.
pub fn set_session_cookie(policy: CookiePolicy, token: &str) -> String {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(policy.secure)
        .max_age(Duration::seconds(SESSION_TTL_MS / 1000))
        .build()
        .to_string()
}

/// `Set-Cookie` value telling the client to drop the session cookie.
pub fn clear_session_cookie(policy: CookiePolicy) -> String {
    Cookie::build((SESSION_COOKIE_NAME, CLEARED_VALUE))
        .path("/")
        .http_only(true)
        .secure(policy.secure)
        .max_age(Duration::seconds(-1))
        .build()
        .to_string()
}

/// Extracts the session token from a request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == SESSION_COOKIE_NAME {
                return Some(cookie.value().to_owned());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::HeaderValue;

    fn development() -> CookiePolicy {
        CookiePolicy::for_environment(Environment::Development)
    }

    fn production() -> CookiePolicy {
        CookiePolicy::for_environment(Environment::Production)
    }

    #[test]
    fn set_cookie_carries_token_scope_and_ttl() {
        let directive = set_session_cookie(development(), "abc123");
        let cookie = Cookie::parse(directive).unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(2_592_000)));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn secure_flag_only_in_production() {
        let plain = set_session_cookie(development(), "t");
        let hardened = set_session_cookie(production(), "t");

        assert!(!plain.contains("Secure"));
        assert!(hardened.contains("Secure"));
    }

    #[test]
    fn clear_cookie_invalidates_immediately() {
        let directive = clear_session_cookie(development());
        let cookie = Cookie::parse(directive).unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "invalid");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(-1)));
    }

    #[test]
    fn session_token_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_id=deadbeef; lang=en"),
        );

        assert_eq!(session_token(&headers), Some("deadbeef".to_owned()));
    }

    #[test]
    fn session_token_absent_when_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));

        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
