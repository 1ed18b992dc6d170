use confique::Config;

/// Connection to the IAM backend
#[derive(Debug, Config, Clone)]
pub struct IamConfig {
    /// Base URL of the IAM backend (default: http://localhost:8000)
    #[config(env = "IAM_GATE_IAM_URL", default = "http://localhost:8000")]
    pub url: String,

    /// Timeout of a whole IAM request in seconds (default: 5)
    #[config(env = "IAM_GATE_IAM_QUERY_TIMEOUT", default = 5)]
    pub query_timeout: u64,

    /// Timeout for connecting to the IAM backend in seconds (default: 2)
    #[config(env = "IAM_GATE_IAM_CONNECT_TIMEOUT", default = 2)]
    pub connect_timeout: u64,
}
