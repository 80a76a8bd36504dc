use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const STORE_API_KEY: &str = "store_api_key";
const TMDB_API_KEY: &str = "tmdb_api_key";
const WORKER_TOKEN: &str = "worker_token";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Secrets kept out of `config.toml`.
///
/// Environment variables take precedence over the file so containers can
/// inject secrets without writing them to disk.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    fn get_with_env(&self, key: &str, env_var: &str) -> Option<String> {
        std::env::var(env_var)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.get(key).cloned())
    }

    pub fn store_api_key(&self) -> Option<String> {
        self.get_with_env(STORE_API_KEY, "LINKVAULT_STORE_KEY")
    }

    pub fn set_store_api_key(&mut self, key: String) {
        self.set(STORE_API_KEY.to_string(), key);
    }

    pub fn tmdb_api_key(&self) -> Option<String> {
        self.get_with_env(TMDB_API_KEY, "LINKVAULT_TMDB_KEY")
    }

    pub fn set_tmdb_api_key(&mut self, key: String) {
        self.set(TMDB_API_KEY.to_string(), key);
    }

    pub fn worker_token(&self) -> Option<String> {
        self.get_with_env(WORKER_TOKEN, "LINKVAULT_WORKER_TOKEN")
    }

    pub fn set_worker_token(&mut self, token: String) {
        self.set(WORKER_TOKEN.to_string(), token);
    }

    pub fn get_all_keys(&self) -> Vec<String> {
        self.credentials.keys().cloned().collect()
    }
}
