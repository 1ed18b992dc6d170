//! Session cookies written after a successful login and read on every later request.
//!
//! Values are stored form-URL-encoded, so the identity cookies stay readable by
//! the frontend.

use axum_extra::extract::cookie::{Cookie, SameSite};
use http::header::COOKIE;
use http::HeaderMap;
use iam_client::TokenIdResponse;
use log::error;
use thiserror::Error;
use url::form_urlencoded;

#[derive(Debug, Error)]
#[error("Failed to decode cookie {name}: {source}")]
pub struct CookieDecodeError {
    pub name: String,
    source: std::string::FromUtf8Error,
}

/// Session token issued by the IAM backend for a one-time login code
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionToken {
    pub id: String,
    /// Lifetime in seconds
    pub ttl: i64,
    pub user_email: String,
    pub user_name: String,
}

impl From<TokenIdResponse> for SessionToken {
    fn from(response: TokenIdResponse) -> Self {
        Self {
            id: response.id,
            ttl: response.ttl,
            user_email: response.user_email,
            user_name: response.user_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CookieNames {
    pub token_id: String,
    pub user_email: String,
    pub user_name: String,
}

impl Default for CookieNames {
    fn default() -> Self {
        Self {
            token_id: "iam_token_id".to_string(),
            user_email: "UserEmail".to_string(),
            user_name: "UserName".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CookieSessionStore {
    names: CookieNames,
}

impl CookieSessionStore {
    pub fn new(names: CookieNames) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &CookieNames {
        &self.names
    }

    /// The three session cookies for `token`, scoped to `host`.
    ///
    /// Only the token id cookie is hidden from scripts.
    pub fn session_cookies(&self, host: &str, token: &SessionToken) -> Vec<Cookie<'static>> {
        let domain = strip_port(host).to_string();
        vec![
            self.cookie(&self.names.user_email, &token.user_email, &domain, token.ttl, false),
            self.cookie(&self.names.user_name, &token.user_name, &domain, token.ttl, false),
            self.cookie(&self.names.token_id, &token.id, &domain, token.ttl, true),
        ]
    }

    fn cookie(
        &self,
        name: &str,
        value: &str,
        domain: &str,
        max_age: i64,
        http_only: bool,
    ) -> Cookie<'static> {
        Cookie::build((name.to_string(), encode(value)))
            .domain(domain.to_string())
            .path("/")
            .http_only(http_only)
            .secure(true)
            .same_site(SameSite::None)
            .max_age(time::Duration::seconds(max_age))
            .build()
    }

    /// Token id of the current session.
    ///
    /// A missing cookie is the normal state of a user who has not logged in yet.
    pub fn read_session_token(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<String>, CookieDecodeError> {
        read_cookie(headers, &self.names.token_id)
            .map(|value| decode(&self.names.token_id, &value))
            .transpose()
    }

    /// Email of the logged-in user, logged and dropped when it cannot be decoded
    pub fn read_user_email(&self, headers: &HeaderMap) -> Option<String> {
        let value = read_cookie(headers, &self.names.user_email)?;
        match decode(&self.names.user_email, &value) {
            Ok(email) => Some(email),
            Err(e) => {
                error!("cookies.user_email {e}");
                None
            }
        }
    }
}

/// Raw value of the first cookie called `name` across all `Cookie` headers
fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| Cookie::split_parse(header.to_string()))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// `urlencoding` rejects invalid UTF-8 where `form_urlencoded` would replace it lossily
fn decode(name: &str, value: &str) -> Result<String, CookieDecodeError> {
    urlencoding::decode(&value.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|source| CookieDecodeError {
            name: name.to_string(),
            source,
        })
}

/// Host without its port; cookie domains cannot carry one
pub(crate) fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &host[..end + 2],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn token() -> SessionToken {
        SessionToken {
            id: "tok/1=".to_string(),
            ttl: 3600,
            user_email: "jane+doe@example.com".to_string(),
            user_name: "Jane Doe".to_string(),
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let store = CookieSessionStore::default();
        let cookies = store.session_cookies("app.example.com:8443", &token());
        assert_eq!(cookies.len(), 3);

        for cookie in &cookies {
            assert_eq!(cookie.domain(), Some("app.example.com"));
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::None));
            assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
        }

        let by_name = |name: &str| cookies.iter().find(|c| c.name() == name).unwrap();
        assert_eq!(by_name("iam_token_id").http_only(), Some(true));
        assert_eq!(by_name("iam_token_id").value(), "tok%2F1%3D");
        assert_eq!(by_name("UserEmail").http_only(), Some(false));
        assert_eq!(by_name("UserEmail").value(), "jane%2Bdoe%40example.com");
        assert_eq!(by_name("UserName").http_only(), Some(false));
        assert_eq!(by_name("UserName").value(), "Jane+Doe");
    }

    #[test]
    fn test_read_session_token_decodes_value() {
        let store = CookieSessionStore::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; iam_token_id=tok%2F1%3D; UserName=Jane+Doe"),
        );

        assert_eq!(
            store.read_session_token(&headers).unwrap(),
            Some("tok/1=".to_string())
        );
    }

    #[test]
    fn test_read_session_token_absent() {
        let store = CookieSessionStore::default();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("UserEmail=a%40b.c"));

        assert_eq!(store.read_session_token(&headers).unwrap(), None);
        assert_eq!(store.read_session_token(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn test_read_session_token_invalid_utf8() {
        let store = CookieSessionStore::default();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("iam_token_id=%FF%FE"));

        let err = store.read_session_token(&headers).unwrap_err();
        assert_eq!(err.name, "iam_token_id");
    }

    #[test]
    fn test_read_user_email_across_cookie_headers() {
        let store = CookieSessionStore::default();
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("iam_token_id=t"));
        headers.append(COOKIE, HeaderValue::from_static("UserEmail=jane%2Bdoe%40example.com"));

        assert_eq!(
            store.read_user_email(&headers),
            Some("jane+doe@example.com".to_string())
        );
    }

    #[test]
    fn test_custom_cookie_names() {
        let store = CookieSessionStore::new(CookieNames {
            token_id: "sid".to_string(),
            ..Default::default()
        });
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("iam_token_id=a; sid=b"));

        assert_eq!(store.read_session_token(&headers).unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
    }
}
