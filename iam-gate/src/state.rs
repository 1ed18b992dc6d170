use crate::config::{GateConfig, IamConfig};
use crate::errors::StartupError;
use crate::gateway::AuthenticationGateway;
use crate::permissions::{MatchedPathResolver, PermissionPolicy, PermissionResolver};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use iam_client::{HttpIamClient, SessionTokenClient};
use log::info;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub gateway: AuthenticationGateway,
    pub resolver: PermissionResolver,
}

impl AppState {
    fn create_iam_client(config: &IamConfig) -> Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Client::builder()
            // The request deadline covers connect, send and body
            .timeout(Duration::from_secs(config.query_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
    }

    /// Builds the state from configuration: loads the policy file and connects to IAM
    pub fn from_config(config: GateConfig) -> Result<Self, StartupError> {
        let policy = PermissionPolicy::load_from_file(&config.policy_file)?;
        let client = HttpIamClient::new(
            config.iam.url.clone(),
            Self::create_iam_client(&config.iam)?,
        );
        info!("Using IAM backend at {}", client.base_url());

        Ok(Self::new(config, policy, Arc::new(client)))
    }

    pub fn new(
        config: GateConfig,
        policy: PermissionPolicy,
        client: Arc<dyn SessionTokenClient>,
    ) -> Self {
        let gateway = AuthenticationGateway::new(client, config.gateway_config());
        let resolver =
            PermissionResolver::new(Arc::new(policy)).with_route_templates(MatchedPathResolver);

        Self {
            config: Arc::new(config),
            gateway,
            resolver,
        }
    }
}
