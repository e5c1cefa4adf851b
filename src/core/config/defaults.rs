use crate::api::DEFAULT_RANDOMNESS;
use crate::core::config::data::Config;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "BLOGCHAT_API_URL";

impl Config {
    /// Resolves the API base URL. A `--url` flag wins over the
    /// `BLOGCHAT_API_URL` environment variable, which wins over the config file.
    pub fn resolve_base_url(&self, cli_url: Option<&str>) -> String {
        let env_url = std::env::var(API_URL_ENV).ok();
        self.resolve_base_url_with(cli_url, env_url.as_deref())
    }

    pub(crate) fn resolve_base_url_with(&self, cli_url: Option<&str>, env_url: Option<&str>) -> String {
        [cli_url, env_url, self.base_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    pub fn randomness_or_default(&self) -> f64 {
        self.randomness.unwrap_or(DEFAULT_RANDOMNESS)
    }

    pub fn stream_enabled(&self) -> bool {
        self.stream.unwrap_or(true)
    }
}
