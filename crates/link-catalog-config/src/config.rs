use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    pub worker: WorkerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// PostgREST endpoint holding the link collections
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    pub url: String,
    #[serde(default = "default_movie_table")]
    pub movie_table: String,
    #[serde(default = "default_series_table")]
    pub series_table: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkerConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Retry and timeout knobs for the scrape/reconcile pipeline
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
    #[serde(default = "default_lookup_timeout_secs")]
    pub metadata_timeout_secs: u64,
    #[serde(default = "default_lookup_timeout_secs")]
    pub resolve_timeout_secs: u64,
    #[serde(default = "default_full_season_episodes")]
    pub full_season_episodes: u32,
}

fn default_movie_table() -> String {
    "download_links".to_string()
}

fn default_series_table() -> String {
    "series_links".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_metadata_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w200".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_poll_attempts() -> u32 {
    8
}

fn default_poll_delay_ms() -> u64 {
    1000
}

fn default_lookup_timeout_secs() -> u64 {
    20
}

fn default_full_season_episodes() -> u32 {
    30
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: default_metadata_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_delay_ms: default_poll_delay_ms(),
            metadata_timeout_secs: default_lookup_timeout_secs(),
            resolve_timeout_secs: default_lookup_timeout_secs(),
            full_season_episodes: default_full_season_episodes(),
        }
    }
}

impl EngineConfig {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl WorkerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Starter configuration written by `linkvault config init`
    pub fn template() -> Self {
        Self {
            store: StoreConfig {
                url: "https://YOUR_PROJECT.supabase.co".to_string(),
                movie_table: default_movie_table(),
                series_table: default_series_table(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            metadata: MetadataConfig::default(),
            worker: WorkerConfig {
                base_url: "http://localhost:4000".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            engine: EngineConfig::default(),
        }
    }

    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.url.trim().is_empty() || self.store.url.contains("YOUR_PROJECT") {
            return Err(anyhow::anyhow!("store.url is not configured"));
        }
        if self.store.movie_table.trim().is_empty() || self.store.series_table.trim().is_empty() {
            return Err(anyhow::anyhow!("store table names cannot be empty"));
        }
        if self.worker.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("worker.base_url is not configured"));
        }
        if self.metadata.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("metadata.base_url cannot be empty"));
        }
        if self.engine.poll_attempts == 0 {
            return Err(anyhow::anyhow!("engine.poll_attempts must be at least 1"));
        }
        if self.engine.full_season_episodes == 0 {
            return Err(anyhow::anyhow!("engine.full_season_episodes must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn configured() -> Config {
        let mut config = Config::template();
        config.store.url = "https://abc.supabase.co".to_string();
        config
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = configured();
        config.engine.poll_attempts = 3;

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.store.url, "https://abc.supabase.co");
        assert_eq!(loaded.engine.poll_attempts, 3);
        assert_eq!(loaded.store.movie_table, "download_links");
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            url = "https://abc.supabase.co"

            [worker]
            base_url = "http://localhost:4000"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.poll_attempts, 8);
        assert_eq!(config.engine.poll_delay(), Duration::from_millis(1000));
        assert_eq!(config.engine.resolve_timeout(), Duration::from_secs(20));
        assert_eq!(config.engine.full_season_episodes, 30);
        assert_eq!(config.store.series_table, "series_links");
        assert_eq!(config.metadata.image_base_url, "https://image.tmdb.org/t/p/w200");
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::template();
        assert!(config.validate().is_err());

        config.store.url = "https://abc.supabase.co".to_string();
        assert!(config.validate().is_ok());

        config.engine.poll_attempts = 0;
        assert!(config.validate().is_err());
    }
}
