use moviefinder_catalog::TmdbConfig;
use moviefinder_catalog::tmdb::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};

/// Runtime settings, read from `MOVIEFINDER_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub tmdb: TmdbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: "moviefinder.db".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            tmdb: TmdbConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            db_path: get("MOVIEFINDER_DB").unwrap_or(defaults.db_path),
            bind_addr: get("MOVIEFINDER_BIND").unwrap_or(defaults.bind_addr),
            tmdb: TmdbConfig {
                base_url: get("MOVIEFINDER_TMDB_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                api_key: get("MOVIEFINDER_TMDB_KEY"),
                access_token: get("MOVIEFINDER_TMDB_TOKEN"),
                language: get("MOVIEFINDER_TMDB_LANGUAGE")
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            },
        }
    }

    pub fn has_tmdb_credentials(&self) -> bool {
        self.tmdb.api_key.is_some() || self.tmdb.access_token.is_some()
    }
}
