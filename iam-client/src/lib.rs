//! # iam-client
//!
//! Client side of the IAM backend contract. The IAM backend owns authentication:
//! it hosts the login page, turns one-time codes into session tokens and knows
//! which permissions a token or an access key holds for a given service.
//!
//! ## Components
//!
//! - **SessionTokenClient:** the narrow async boundary the access-control layer talks to.
//! - **HttpIamClient:** reqwest implementation of the `/api/v2` endpoints.
//! - **models:** request and response bodies of those endpoints.

pub mod error;
pub mod http_client;
pub mod models;

pub use crate::error::IamError;
pub use crate::http_client::HttpIamClient;
pub use crate::models::{
    AccessKeyPermissionsResponse, AuthLinkResponse, TokenIdResponse, TokenPermissionsResponse,
    TokenValidResponse,
};

use async_trait::async_trait;

/// Header carrying the id of the service that calls the IAM backend
pub const HEADER_CLIENT_ID: &str = "X-Client-Id";

/// Operations the access-control layer needs from the IAM backend.
///
/// Every call is a single round trip. Implementations must not retry; a failed
/// call is reported to the caller as is.
#[async_trait]
pub trait SessionTokenClient: Send + Sync {
    /// Exchanges the one-time code from the hosted login for a session token
    async fn get_token_id(&self, code: &str) -> Result<TokenIdResponse, IamError>;

    /// Returns the hosted login link that brings the user back to `back_url`
    async fn get_auth_link(&self, back_url: &str) -> Result<AuthLinkResponse, IamError>;

    /// Returns the permissions a session token holds for `service_id`
    async fn get_token_permissions(
        &self,
        token_id: &str,
        service_id: &str,
        back_url: &str,
    ) -> Result<TokenPermissionsResponse, IamError>;

    /// Returns the permissions an access key holds for `service_id`
    async fn get_access_key_permissions(
        &self,
        key: &str,
        service_id: &str,
    ) -> Result<AccessKeyPermissionsResponse, IamError>;

    /// Checks that a session token is still valid, regardless of service
    async fn is_token_valid(&self, token_id: &str) -> Result<TokenValidResponse, IamError>;
}
