//! Authentication of inbound requests against the IAM backend.
//!
//! Per request, the gateway takes exactly one of these paths:
//! 1. `X-Access-Key` header present: app2app authentication by access key, never
//!    falls through to the cookie flow.
//! 2. `code` and `finalBackURL` query parameters present: return trip from the IAM
//!    hosted login, the code is exchanged for a session token which is stored in
//!    cookies before the browser is redirected to `finalBackURL`.
//! 3. No session cookie: the user is challenged with an IAM login link.
//! 4. Session cookie present: the IAM backend decides what the token may do.

mod access_key;
mod session;

use crate::cookies::CookieNames;
use crate::decision::{AuthDecision, Principal};
use http::request::Parts;
use http::{HeaderMap, StatusCode};
use iam_client::SessionTokenClient;
use log::{error, warn};
use serde::Deserialize;
use session::{Negotiator, SessionStep};
use std::sync::Arc;

/// Where the user id of a cookie-authenticated request comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserIdSource {
    /// The user email cookie written at login
    #[default]
    Cookie,
    /// The client identity header
    Header,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderNames {
    /// Inbound app2app credential
    pub access_key: String,
    /// Inbound caller identity
    pub client_id: String,
    /// Request URI as seen by a reverse proxy in front of the service
    pub original_request_uri: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            access_key: "X-Access-Key".to_string(),
            client_id: iam_client::HEADER_CLIENT_ID.to_string(),
            original_request_uri: "X-Original-Request-Uri".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Id of the protected service as registered in IAM
    pub service_id: String,
    pub headers: HeaderNames,
    pub cookies: CookieNames,
    pub user_id_source: UserIdSource,
    /// Scheme of the URL IAM sends the user back to
    pub back_url_scheme: String,
}

impl GatewayConfig {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            headers: HeaderNames::default(),
            cookies: CookieNames::default(),
            user_id_source: UserIdSource::default(),
            back_url_scheme: "https".to_string(),
        }
    }

    pub fn with_user_id_source(mut self, source: UserIdSource) -> Self {
        self.user_id_source = source;
        self
    }
}

/// Non-empty value of a header
pub(crate) fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Authenticates users by session cookie and applications by access key, and
/// asks the IAM backend for the permissions they hold on this service.
#[derive(Clone)]
pub struct AuthenticationGateway {
    negotiator: Negotiator,
}

impl AuthenticationGateway {
    pub fn new(client: Arc<dyn SessionTokenClient>, config: GatewayConfig) -> Self {
        Self {
            negotiator: Negotiator::new(client, config),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.negotiator.config
    }

    pub async fn authenticate(&self, request: &Parts) -> AuthDecision {
        let config = &self.negotiator.config;
        if let Some(key) = header_value(&request.headers, &config.headers.access_key) {
            return self.authenticate_access_key(key, &request.headers).await;
        }

        match self.negotiator.resume(request).await {
            SessionStep::Decided(decision) => decision,
            SessionStep::Token { token_id, back_url } => {
                self.query_permissions(request, &token_id, &back_url).await
            }
        }
    }

    /// Authenticates by access key only; requests without one are unauthorized
    pub async fn authenticate_access_key_only(&self, request: &Parts) -> AuthDecision {
        let config = &self.negotiator.config;
        match header_value(&request.headers, &config.headers.access_key) {
            Some(key) => self.authenticate_access_key(key, &request.headers).await,
            None => {
                warn!("{} header is missing", config.headers.access_key);
                AuthDecision::Deny(StatusCode::UNAUTHORIZED)
            }
        }
    }

    async fn query_permissions(
        &self,
        request: &Parts,
        token_id: &str,
        back_url: &str,
    ) -> AuthDecision {
        let config = &self.negotiator.config;
        let response = match self
            .negotiator
            .client
            .get_token_permissions(token_id, &config.service_id, back_url)
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                error!("gateway.token_permissions.timeout {e}");
                return AuthDecision::internal();
            }
            Err(e) => {
                error!("gateway.token_permissions {e}");
                return AuthDecision::internal();
            }
        };

        match response.http_status {
            401 => AuthDecision::Challenge(response.redirect_url),
            200 => AuthDecision::Allow(Principal::new(
                response.permissions,
                self.negotiator.user_id(&request.headers),
            )),
            status => AuthDecision::deny_with(status),
        }
    }
}

/// Authenticates users by session cookie without asking for service permissions.
///
/// Meant for surfaces that are not bound to a single service, such as the IAM
/// administration itself. Access keys are not handled and a valid session is
/// allowed with an empty permission set; an invalid one is answered with 401.
#[derive(Clone)]
pub struct SimpleAuthenticationGateway {
    negotiator: Negotiator,
}

impl SimpleAuthenticationGateway {
    pub fn new(client: Arc<dyn SessionTokenClient>, config: GatewayConfig) -> Self {
        Self {
            negotiator: Negotiator::new(client, config),
        }
    }

    pub async fn authenticate(&self, request: &Parts) -> AuthDecision {
        let token_id = match self.negotiator.resume(request).await {
            SessionStep::Decided(decision) => return decision,
            SessionStep::Token { token_id, .. } => token_id,
        };

        match self.negotiator.client.is_token_valid(&token_id).await {
            Ok(response) if response.success => AuthDecision::Allow(Principal::new(
                Vec::<String>::new(),
                self.negotiator.user_id(&request.headers),
            )),
            Ok(_) => AuthDecision::Deny(StatusCode::UNAUTHORIZED),
            Err(e) => {
                error!("gateway.token_valid {e}");
                AuthDecision::internal()
            }
        }
    }
}
