use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use http::header::{LOCATION, SET_COOKIE};
use http::{HeaderValue, StatusCode};
use log::error;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;

/// Authenticated caller of a request: what it may do and who it is.
///
/// Produced once per request and handed explicitly to the next stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Principal {
    pub permissions: BTreeSet<String>,
    pub user_id: String,
}

impl Principal {
    pub fn new<I, S>(permissions: I, user_id: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
            user_id: user_id.into(),
        }
    }

    pub fn has(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Terminal outcome of authenticating or authorizing a request
#[derive(Debug, Clone)]
pub enum AuthDecision {
    /// Let the request through to the protected handler
    Allow(Principal),
    /// Send the user to the IAM login page
    Challenge(String),
    /// Return trip from the IAM login: store the session cookies and redirect
    /// the browser to where it came from
    SessionEstablished {
        location: String,
        cookies: Vec<Cookie<'static>>,
    },
    /// Refuse the request with the given status
    Deny(StatusCode),
    /// The decision could not be made
    Error {
        status: StatusCode,
        message: Option<String>,
    },
}

impl AuthDecision {
    pub fn bad_request<S: ToString>(message: S) -> Self {
        AuthDecision::Error {
            status: StatusCode::BAD_REQUEST,
            message: Some(message.to_string()),
        }
    }

    pub fn internal() -> Self {
        AuthDecision::Error {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        }
    }

    pub fn forbidden() -> Self {
        AuthDecision::Deny(StatusCode::FORBIDDEN)
    }

    /// Maps a decision status reported by the IAM backend.
    ///
    /// Statuses that are not valid HTTP codes (e.g. a missing field decoded as 0)
    /// cannot be passed through and become an internal error.
    pub fn deny_with(status: u16) -> Self {
        match StatusCode::from_u16(status) {
            Ok(status) => AuthDecision::Deny(status),
            Err(_) => {
                error!("gateway.status invalid decision status from IAM: {status}");
                AuthDecision::internal()
            }
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, AuthDecision::Allow(_))
    }

    /// Status the decision renders with
    pub fn status(&self) -> StatusCode {
        match self {
            AuthDecision::Allow(_) => StatusCode::OK,
            AuthDecision::Challenge(_) => StatusCode::UNAUTHORIZED,
            AuthDecision::SessionEstablished { .. } => StatusCode::TEMPORARY_REDIRECT,
            AuthDecision::Deny(status) => *status,
            AuthDecision::Error { status, .. } => *status,
        }
    }
}

impl IntoResponse for AuthDecision {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AuthDecision::Allow(_) | AuthDecision::Deny(_) => status.into_response(),
            AuthDecision::Challenge(redirect_url) => {
                (status, Json(json!({ "redirect_url": redirect_url }))).into_response()
            }
            AuthDecision::SessionEstablished { location, cookies } => {
                let mut response = status.into_response();
                let headers = response.headers_mut();
                for cookie in cookies {
                    match HeaderValue::from_str(&cookie.to_string()) {
                        Ok(value) => {
                            headers.append(SET_COOKIE, value);
                        }
                        Err(e) => error!("gateway.cookie cannot set cookie {}: {e}", cookie.name()),
                    }
                }
                match HeaderValue::from_str(&location) {
                    Ok(value) => {
                        headers.insert(LOCATION, value);
                        response
                    }
                    Err(e) => {
                        error!("gateway.redirect invalid redirect location: {e}");
                        StatusCode::INTERNAL_SERVER_ERROR.into_response()
                    }
                }
            }
            AuthDecision::Error { message, .. } => match message {
                Some(message) => (status, message).into_response(),
                None => status.into_response(),
            },
        }
    }
}
