use crate::error::IamError;
use crate::models::{
    AccessKeyPermissionsRequest, AccessKeyPermissionsResponse, AuthLinkResponse,
    TokenIdResponse, TokenPermissionsRequest, TokenPermissionsResponse, TokenValidRequest,
    TokenValidResponse,
};
use crate::{HEADER_CLIENT_ID, SessionTokenClient};
use async_trait::async_trait;
use http::StatusCode;
use log::{debug, error};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

/// reqwest based implementation of [`SessionTokenClient`].
///
/// Timeouts and connection pooling belong to the supplied [`Client`].
#[derive(Clone, Debug)]
pub struct HttpIamClient {
    client: Client,
    base_url: String,
}

impl HttpIamClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, operation: &str) -> Result<Url, IamError> {
        Ok(Url::parse(&format!("{}/api/v2/{}", self.base_url, operation))?)
    }

    /// Sends the request and decodes a 200 response body.
    ///
    /// `code` prefixes every log line so a failure can be traced back to the call site.
    async fn send<R: DeserializeOwned>(
        &self,
        code: &str,
        request: RequestBuilder,
    ) -> Result<R, IamError> {
        let response = request.send().await.map_err(|e| {
            error!("{code}.transport {e}");
            IamError::Request(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("{code}.status non-200 status from {}: {}", response.url(), status);
            return Err(IamError::InvalidStatus(status));
        }

        let body = response.bytes().await.map_err(|e| {
            error!("{code}.body {e}");
            IamError::Request(e)
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            error!("{code}.decode {e}");
            IamError::Parse(e)
        })
    }
}

/// Whether `value` is usable as a redirect target: an absolute URL or an absolute path
pub fn is_request_uri(value: &str) -> bool {
    if value.starts_with('/') {
        return true;
    }
    Url::parse(value).is_ok()
}

#[async_trait]
impl SessionTokenClient for HttpIamClient {
    async fn get_token_id(&self, code: &str) -> Result<TokenIdResponse, IamError> {
        let mut url = self.endpoint("getTokenId")?;
        url.query_pairs_mut().append_pair("code", code);
        debug!("Exchanging code for token id at {}", self.base_url);

        self.send("iam.token_id", self.client.get(url)).await
    }

    async fn get_auth_link(&self, back_url: &str) -> Result<AuthLinkResponse, IamError> {
        let mut url = self.endpoint("getAuthLink")?;
        url.query_pairs_mut().append_pair("backURL", back_url);

        let response: AuthLinkResponse = self.send("iam.auth_link", self.client.get(url)).await?;
        if !is_request_uri(&response.redirect_url) {
            error!(
                "iam.auth_link.redirect invalid auth link from IAM '{}'",
                response.redirect_url
            );
            return Err(IamError::InvalidRedirect(response.redirect_url));
        }

        Ok(response)
    }

    async fn get_token_permissions(
        &self,
        token_id: &str,
        service_id: &str,
        back_url: &str,
    ) -> Result<TokenPermissionsResponse, IamError> {
        let url = self.endpoint("getTokenPermissions")?;
        let body = TokenPermissionsRequest {
            id: token_id.to_string(),
            service_id: service_id.to_string(),
            back_url: back_url.to_string(),
        };

        let response: TokenPermissionsResponse = self
            .send("iam.token_permissions", self.client.post(url).json(&body))
            .await?;
        if !response.redirect_url.is_empty() && !is_request_uri(&response.redirect_url) {
            error!(
                "iam.token_permissions.redirect invalid auth link from IAM '{}'",
                response.redirect_url
            );
            return Err(IamError::InvalidRedirect(response.redirect_url));
        }

        Ok(response)
    }

    async fn get_access_key_permissions(
        &self,
        key: &str,
        service_id: &str,
    ) -> Result<AccessKeyPermissionsResponse, IamError> {
        let url = self.endpoint("getAccessKeyPermissions")?;
        let body = AccessKeyPermissionsRequest {
            key: key.to_string(),
            service_id: service_id.to_string(),
        };
        let request = self
            .client
            .post(url)
            .header(HEADER_CLIENT_ID, service_id)
            .json(&body);

        self.send("iam.access_key_permissions", request).await
    }

    async fn is_token_valid(&self, token_id: &str) -> Result<TokenValidResponse, IamError> {
        let url = self.endpoint("isTokenValid")?;
        let body = TokenValidRequest {
            id: token_id.to_string(),
        };

        self.send("iam.token_valid", self.client.post(url).json(&body))
            .await
    }
}
