//! Request and response bodies of the IAM backend `/api/v2` endpoints.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/v2/getAuthLink`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct AuthLinkResponse {
    /// Hosted login page the user has to be sent to
    #[serde(default)]
    pub redirect_url: String,
}

/// Response of `GET /api/v2/getTokenId`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TokenIdResponse {
    /// Token id bound to the one-time code
    #[serde(default)]
    pub id: String,

    /// Token lifetime in seconds
    #[serde(default)]
    pub ttl: i64,

    #[serde(default)]
    pub user_email: String,

    #[serde(default)]
    pub user_name: String,
}

/// Body of `POST /api/v2/getTokenPermissions`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenPermissionsRequest {
    /// Token id
    pub id: String,

    /// Service the permissions are requested for
    pub service_id: String,

    /// Where IAM returns the user after a successful login
    #[serde(rename = "backURL")]
    pub back_url: String,
}

/// Response of `POST /api/v2/getTokenPermissions`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TokenPermissionsResponse {
    /// Decision status for the token (200, 401, 403, ...)
    #[serde(default)]
    pub http_status: u16,

    #[serde(default)]
    pub permissions: Vec<String>,

    /// Login link, set when the session has expired
    #[serde(default)]
    pub redirect_url: String,
}

/// Body of `POST /api/v2/getAccessKeyPermissions`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessKeyPermissionsRequest {
    pub key: String,
    pub service_id: String,
}

/// Response of `POST /api/v2/getAccessKeyPermissions`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct AccessKeyPermissionsResponse {
    #[serde(default)]
    pub http_status: u16,

    #[serde(default)]
    pub permissions: Vec<String>,

    /// Identity the access key belongs to
    #[serde(default)]
    pub user_id: String,
}

/// Body of `POST /api/v2/isTokenValid`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenValidRequest {
    pub id: String,
}

/// Response of `POST /api/v2/isTokenValid`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TokenValidResponse {
    #[serde(default)]
    pub success: bool,
}
