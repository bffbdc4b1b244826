//! Renewal cookie management.
//!
//! The renewal token travels exclusively inside a hardened cookie: HTTP-only
//! (no script access), Secure, and `SameSite=None` because the web client
//! and this API sit on different origins. The clear directive must repeat
//! the same scope flags as the set directive - browsers silently ignore a
//! removal whose attributes don't match, which would break logout.

use axum::http::{HeaderMap, header};

use crate::config::{Config, SessionConfig};

/// Builds and reads the renewal cookie.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    secure: bool,
    same_site: String,
    max_age_secs: u64,
}

impl SessionCookies {
    pub fn new(session: &SessionConfig, max_age: std::time::Duration) -> Self {
        Self {
            name: session.cookie_name.clone(),
            secure: session.cookie_secure,
            same_site: canonical_same_site(&session.cookie_same_site),
            max_age_secs: max_age.as_secs(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.auth.session, config.auth.tokens.refresh_token_ttl)
    }

    /// `Set-Cookie` value attaching the renewal token.
    pub fn set(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly;{} SameSite={}; Max-Age={}",
            self.name,
            token,
            if self.secure { " Secure;" } else { "" },
            self.same_site,
            self.max_age_secs
        )
    }

    /// `Set-Cookie` value removing the renewal cookie. Flags match
    /// [`SessionCookies::set`] exactly; only the value and max-age differ.
    pub fn clear(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly;{} SameSite={}; Max-Age=0",
            self.name,
            if self.secure { " Secure;" } else { "" },
            self.same_site
        )
    }

    /// Extract the renewal token from a request's `Cookie` header, if present.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        let cookie_str = headers.get(header::COOKIE)?.to_str().ok()?;

        for cookie in cookie_str.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == self.name {
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}

/// Normalise the configured attribute to its canonical header spelling.
fn canonical_same_site(value: &str) -> String {
    match value.to_ascii_lowercase().as_str() {
        "strict" => "Strict".to_string(),
        "lax" => "Lax".to_string(),
        _ => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn cookies() -> SessionCookies {
        SessionCookies::new(&SessionConfig::default(), std::time::Duration::from_secs(7 * 24 * 60 * 60))
    }

    #[test]
    fn test_set_cookie_flags() {
        let header = cookies().set("token-value");
        assert_eq!(
            header,
            "jwt=token-value; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=604800"
        );
    }

    #[test]
    fn test_clear_matches_set_flags() {
        let c = cookies();
        let set = c.set("token-value");
        let clear = c.clear();

        // Same scope attributes on both directives, otherwise the browser
        // keeps the cookie.
        for flag in ["Path=/", "HttpOnly", "Secure", "SameSite=None"] {
            assert!(set.contains(flag), "set missing {flag}");
            assert!(clear.contains(flag), "clear missing {flag}");
        }
        assert!(clear.starts_with("jwt=;"));
        assert!(clear.ends_with("Max-Age=0"));
    }

    #[test]
    fn test_insecure_cookie_omits_secure_flag() {
        let session = SessionConfig {
            cookie_secure: false,
            cookie_same_site: "lax".to_string(),
            ..SessionConfig::default()
        };
        let c = SessionCookies::new(&session, std::time::Duration::from_secs(60));

        assert_eq!(c.set("v"), "jwt=v; Path=/; HttpOnly; SameSite=Lax; Max-Age=60");
        assert!(!c.clear().contains("Secure"));
    }

    #[test]
    fn test_read_extracts_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; jwt=abc.def.ghi; lang=en"));

        assert_eq!(cookies().read(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_read_absent() {
        let mut headers = HeaderMap::new();
        assert!(cookies().read(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(cookies().read(&headers).is_none());
    }

    #[test]
    fn test_read_ignores_prefix_names() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt_extra=nope; jwt=yes"));

        assert_eq!(cookies().read(&headers).as_deref(), Some("yes"));
    }
}
