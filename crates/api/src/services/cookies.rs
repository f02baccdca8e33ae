//! Cookie helper for the session and OAuth state cookies.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::config::AuthConfig;

/// Name of the short-lived cookie holding the signed OAuth state.
pub const STATE_COOKIE_NAME: &str = "oauth_state";

/// Lifetime of the OAuth state cookie in seconds.
pub const STATE_COOKIE_TTL_SECS: i64 = 600;

/// Builds and reads the HttpOnly cookies used by browser sessions.
#[derive(Debug, Clone)]
pub struct CookieHelper {
    session_cookie_name: String,
    session_ttl_secs: i64,
    secure: bool,
}

impl CookieHelper {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            session_cookie_name: config.session_cookie_name.clone(),
            session_ttl_secs: config.session_ttl_secs,
            secure: config.secure_cookies,
        }
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }

    /// Build a Set-Cookie header value for the session token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        self.build_cookie(&self.session_cookie_name, token, "/", self.session_ttl_secs)
    }

    /// Build a Set-Cookie header that clears the session cookie.
    pub fn build_clear_session_cookie(&self) -> String {
        self.build_clear_cookie(&self.session_cookie_name, "/")
    }

    /// Build a Set-Cookie header value for the OAuth state.
    pub fn build_state_cookie(&self, state: &str) -> String {
        self.build_cookie(STATE_COOKIE_NAME, state, "/auth", STATE_COOKIE_TTL_SECS)
    }

    /// Build a Set-Cookie header that clears the OAuth state cookie.
    pub fn build_clear_state_cookie(&self) -> String {
        self.build_clear_cookie(STATE_COOKIE_NAME, "/auth")
    }

    /// Extract a cookie value from request headers by name.
    pub fn extract_cookie<'a>(&self, headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get_all(axum::http::header::COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|cookie_header| cookie_header.split(';'))
            .map(|s| s.trim())
            .find_map(|cookie| {
                let (cookie_name, cookie_value) = cookie.split_once('=')?;
                (cookie_name == name && !cookie_value.is_empty()).then_some(cookie_value)
            })
    }

    pub fn extract_session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        self.extract_cookie(headers, &self.session_cookie_name)
    }

    pub fn extract_state<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        self.extract_cookie(headers, STATE_COOKIE_NAME)
    }

    /// Append Set-Cookie headers, skipping values that are not valid header text.
    pub fn append(headers: &mut HeaderMap, cookies: &[String]) {
        for cookie in cookies {
            if let Ok(value) = HeaderValue::from_str(cookie) {
                headers.append(SET_COOKIE, value);
            }
        }
    }

    // SameSite=Lax so the state cookie survives the provider's redirect back.
    fn build_cookie(&self, name: &str, value: &str, path: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
            name, value, path, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn build_clear_cookie(&self, name: &str, path: &str) -> String {
        let mut cookie = format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
            name, path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn helper(secure: bool) -> CookieHelper {
        CookieHelper {
            session_cookie_name: "session".to_string(),
            session_ttl_secs: 3600,
            secure,
        }
    }

    #[test]
    fn test_build_session_cookie() {
        let cookie = helper(true).build_session_cookie("token123");

        assert!(cookie.starts_with("session=token123"));
        assert!(cookie.contains("Path=/;"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_insecure_cookie_has_no_secure_flag() {
        let cookie = helper(false).build_session_cookie("token123");
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_build_clear_session_cookie() {
        let cookie = helper(false).build_clear_session_cookie();

        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn test_state_cookie() {
        let cookie = helper(false).build_state_cookie("abc.def");
        assert!(cookie.starts_with("oauth_state=abc.def"));
        assert!(cookie.contains("Path=/auth"));
        assert!(cookie.contains("Max-Age=600"));

        let cleared = helper(false).build_clear_state_cookie();
        assert!(cleared.starts_with("oauth_state=;"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; session=tok; oauth_state=st.sig"),
        );

        let helper = helper(false);
        assert_eq!(helper.extract_session_token(&headers), Some("tok"));
        assert_eq!(helper.extract_state(&headers), Some("st.sig"));
        assert_eq!(helper.extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_empty_cookie_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert_eq!(helper(false).extract_session_token(&headers), None);
    }

    #[test]
    fn test_append_cookies() {
        let mut headers = HeaderMap::new();
        let helper = helper(false);
        CookieHelper::append(
            &mut headers,
            &[
                helper.build_session_cookie("tok"),
                helper.build_clear_state_cookie(),
            ],
        );
        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 2);
    }
}
