use super::{header_value, GatewayConfig, UserIdSource};
use crate::cookies::{CookieSessionStore, SessionToken};
use crate::decision::AuthDecision;
use http::header::{HOST, REFERER};
use http::request::Parts;
use http::HeaderMap;
use iam_client::SessionTokenClient;
use log::{debug, error};
use std::sync::Arc;
use thiserror::Error;
use url::{form_urlencoded, Url};

const PARAM_CODE: &str = "code";
const PARAM_FINAL_BACK_URL: &str = "finalBackURL";

#[derive(Debug, Error, PartialEq)]
pub enum BackUrlError {
    #[error("empty referer")]
    EmptyReferer,
    #[error("request has no host")]
    MissingHost,
    #[error("header {0} is not valid UTF-8")]
    InvalidHeader(&'static str),
}

/// Outcome of the cookie flow before the final IAM query
pub(super) enum SessionStep {
    Decided(AuthDecision),
    Token { token_id: String, back_url: String },
}

/// Shared part of both gateways: login callback, back URL and session cookie
#[derive(Clone)]
pub(super) struct Negotiator {
    pub(super) client: Arc<dyn SessionTokenClient>,
    pub(super) config: Arc<GatewayConfig>,
    cookies: CookieSessionStore,
}

impl Negotiator {
    pub(super) fn new(client: Arc<dyn SessionTokenClient>, config: GatewayConfig) -> Self {
        Self {
            client,
            cookies: CookieSessionStore::new(config.cookies.clone()),
            config: Arc::new(config),
        }
    }

    pub(super) async fn resume(&self, request: &Parts) -> SessionStep {
        if let Some((code, final_back_url)) = login_callback(request.uri.query()) {
            return SessionStep::Decided(self.exchange_code(request, &code, &final_back_url).await);
        }

        let back_url = match back_url(request, &self.config) {
            Ok(back_url) => back_url,
            Err(BackUrlError::EmptyReferer) => {
                return SessionStep::Decided(AuthDecision::bad_request(BackUrlError::EmptyReferer))
            }
            Err(e) => {
                error!("gateway.back_url {e}");
                return SessionStep::Decided(AuthDecision::internal());
            }
        };

        let token_id = match self.cookies.read_session_token(&request.headers) {
            Ok(Some(token_id)) => token_id,
            Ok(None) => {
                debug!("No session cookie, requesting an auth link");
                return SessionStep::Decided(self.challenge(&back_url).await);
            }
            Err(e) => {
                error!("gateway.session_cookie {e}");
                return SessionStep::Decided(AuthDecision::internal());
            }
        };

        SessionStep::Token { token_id, back_url }
    }

    async fn challenge(&self, back_url: &str) -> AuthDecision {
        match self.client.get_auth_link(back_url).await {
            Ok(link) => AuthDecision::Challenge(link.redirect_url),
            Err(e) => {
                error!("gateway.auth_link {e}");
                AuthDecision::internal()
            }
        }
    }

    /// Exchanges the login code for a session and sends the browser back to
    /// `final_back_url` with the session cookies set
    async fn exchange_code(
        &self,
        request: &Parts,
        code: &str,
        final_back_url: &str,
    ) -> AuthDecision {
        if let Err(e) = Url::parse(final_back_url) {
            error!("gateway.final_back_url '{final_back_url}': {e}");
            return AuthDecision::bad_request("incorrect finalBackURL");
        }

        let host = match request_host(request) {
            Ok(host) => host,
            Err(e) => {
                error!("gateway.callback_host {e}");
                return AuthDecision::internal();
            }
        };

        let token: SessionToken = match self.client.get_token_id(code).await {
            Ok(response) => response.into(),
            Err(e) => {
                error!("gateway.token_id {e}");
                return AuthDecision::internal();
            }
        };

        AuthDecision::SessionEstablished {
            location: final_back_url.to_string(),
            cookies: self.cookies.session_cookies(host, &token),
        }
    }

    /// User id of a cookie-authenticated request.
    ///
    /// A missing id is unexpected after login but does not fail the request.
    pub(super) fn user_id(&self, headers: &HeaderMap) -> String {
        match self.config.user_id_source {
            UserIdSource::Cookie => self.cookies.read_user_email(headers).unwrap_or_else(|| {
                error!("No cookie {}", self.config.cookies.user_email);
                String::new()
            }),
            UserIdSource::Header => header_value(headers, &self.config.headers.client_id)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    error!("No header {}", self.config.headers.client_id);
                    String::new()
                }),
        }
    }
}

/// `code` and `finalBackURL` of a return trip from the IAM login, both non-empty
fn login_callback(query: Option<&str>) -> Option<(String, String)> {
    let mut code = None;
    let mut final_back_url = None;
    for (key, value) in form_urlencoded::parse(query?.as_bytes()) {
        match key.as_ref() {
            PARAM_CODE if code.is_none() => code = Some(value.into_owned()),
            PARAM_FINAL_BACK_URL if final_back_url.is_none() => {
                final_back_url = Some(value.into_owned())
            }
            _ => {}
        }
    }

    match (code, final_back_url) {
        (Some(code), Some(url)) if !code.is_empty() && !url.is_empty() => Some((code, url)),
        _ => None,
    }
}

fn request_host(request: &Parts) -> Result<&str, BackUrlError> {
    match request.headers.get(HOST) {
        Some(host) => host.to_str().map_err(|_| BackUrlError::InvalidHeader("Host")),
        None => request
            .uri
            .authority()
            .map(|authority| authority.as_str())
            .ok_or(BackUrlError::MissingHost),
    }
}

/// URL the IAM backend returns the user to after login: the current request,
/// carrying the page the user came from as `finalBackURL`.
fn back_url(request: &Parts, config: &GatewayConfig) -> Result<String, BackUrlError> {
    let referer = match request.headers.get(REFERER) {
        Some(value) => value
            .to_str()
            .map_err(|_| BackUrlError::InvalidHeader("Referer"))?,
        None => "",
    };
    if referer.is_empty() {
        return Err(BackUrlError::EmptyReferer);
    }

    let host = request_host(request)?;
    let uri = match header_value(&request.headers, &config.headers.original_request_uri) {
        Some(uri) => uri,
        None => request
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/"),
    };

    let separator = if uri.contains('?') { '&' } else { '?' };
    let final_back_url: String = form_urlencoded::byte_serialize(referer.as_bytes()).collect();

    Ok(format!(
        "{}://{}{}{}{}={}",
        config.back_url_scheme,
        host.trim_matches('/'),
        uri,
        separator,
        PARAM_FINAL_BACK_URL,
        final_back_url
    ))
}
