use super::{header_value, AuthenticationGateway};
use crate::decision::{AuthDecision, Principal};
use http::HeaderMap;
use log::{debug, error, warn};

impl AuthenticationGateway {
    /// app2app authentication: the IAM backend resolves the key's permissions.
    ///
    /// Any non-200 decision status is passed through as is.
    pub(super) async fn authenticate_access_key(
        &self,
        key: &str,
        headers: &HeaderMap,
    ) -> AuthDecision {
        let config = &self.negotiator.config;
        debug!("Authenticating request by {} header", config.headers.access_key);

        let response = match self
            .negotiator
            .client
            .get_access_key_permissions(key, &config.service_id)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("gateway.access_key_permissions {e}");
                return AuthDecision::internal();
            }
        };

        if response.http_status != 200 {
            warn!(
                "Access key rejected by IAM with status {}",
                response.http_status
            );
            return AuthDecision::deny_with(response.http_status);
        }

        // The caller's own claim of identity wins over the key owner's id
        let user_id = header_value(headers, &config.headers.client_id)
            .map(str::to_string)
            .unwrap_or(response.user_id);

        AuthDecision::Allow(Principal::new(response.permissions, user_id))
    }
}
