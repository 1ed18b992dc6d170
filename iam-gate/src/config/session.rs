use crate::gateway::UserIdSource;
use confique::Config;

/// How users are authenticated and identified
#[derive(Debug, Config, Clone)]
pub struct SessionConfig {
    /// Source of the user id: "cookie" (UserEmail cookie) or "header" (X-Client-Id)
    #[config(env = "IAM_GATE_USER_ID_SOURCE", default = "cookie")]
    pub user_id_source: UserIdSource,

    /// Scheme of the URL IAM returns the user to after login (default: https)
    #[config(env = "IAM_GATE_BACK_URL_SCHEME", default = "https")]
    pub back_url_scheme: String,

    /// Accept access keys only, never session cookies (default: false)
    #[config(env = "IAM_GATE_ACCESS_KEY_ONLY", default = false)]
    pub access_key_only: bool,
}
