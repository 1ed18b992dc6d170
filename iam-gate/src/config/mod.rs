pub mod iam;
pub mod session;

pub use crate::config::iam::IamConfig;
pub use crate::config::session::SessionConfig;

use crate::gateway::GatewayConfig;
use confique::Config;

/// Environment variable naming an optional TOML configuration file
pub const CONFIG_FILE_ENV: &str = "IAM_GATE_CONFIG";

/// Main configuration structure of the gate server.
///
/// Environment variables take precedence over the TOML file.
#[derive(Debug, Config, Clone)]
pub struct GateConfig {
    /// The port the server listens on (default: 8080)
    #[config(env = "IAM_GATE_PORT", default = 8080)]
    pub port: u16,

    /// Id of the protected service as registered in IAM
    #[config(env = "IAM_GATE_SERVICE_ID")]
    pub service_id: String,

    /// YAML permission matrix (default: policy.yaml)
    #[config(env = "IAM_GATE_POLICY_FILE", default = "policy.yaml")]
    pub policy_file: String,

    #[config(nested)]
    pub iam: IamConfig,

    #[config(nested)]
    pub session: SessionConfig,
}

impl GateConfig {
    /// Loads the configuration from the environment and the file named by `IAM_GATE_CONFIG`
    pub fn load() -> Result<Self, confique::Error> {
        let mut builder = GateConfig::builder().env();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.file(path);
        }
        builder.load()
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::new(self.service_id.clone())
            .with_user_id_source(self.session.user_id_source);
        config.back_url_scheme = self.session.back_url_scheme.clone();
        config
    }

    #[cfg(test)]
    pub fn for_test_with_mock(iam_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            service_id: crate::test_utils::TEST_SERVICE_ID.to_string(),
            policy_file: "policy.yaml".to_string(),
            iam: IamConfig {
                url: iam_mock.uri(),
                query_timeout: 5,
                connect_timeout: 2,
            },
            session: SessionConfig {
                user_id_source: crate::gateway::UserIdSource::Cookie,
                back_url_scheme: "https".to_string(),
                access_key_only: false,
            },
        }
    }
}
