use serde::{Deserialize, Serialize};

/// Variables checked, in order, for the GitHub personal access token
const GITHUB_TOKEN_VARS: &[&str] = &["GITHUB_API", "GITHUB_TOKEN", "GH_TOKEN"];

/// Secrets for the external services. Only ever read from the environment.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// GitHub token; unauthenticated mode is allowed with lower rate limits
    pub github_token: Option<String>,
    /// Key for the OpenAI-compatible completion service
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("ApiKeys")
            .field("github_token", &mask(&self.github_token))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .finish()
    }
}

impl ApiKeys {
    /// Loads API keys from the process environment
    pub fn from_env() -> Self {
        Self {
            github_token: GITHUB_TOKEN_VARS.iter().find_map(|key| get_env_value(key)),
            openai_api_key: get_env_value("OPENAI_API_KEY"),
        }
    }
}

/// Reads an environment variable, treating empty values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
