pub mod config;
pub mod delete;
pub mod edit;
pub mod groups;
pub mod import;
pub mod prompts;
pub mod resolve;
pub mod scrape;
pub mod scrape_ui;
pub mod search;

use color_eyre::Result;
use link_catalog_config::{Config, CredentialStore, PathManager};
use link_catalog_core::CatalogService;
use link_catalog_models::BulkResult;
use link_catalog_sources::SourceFactory;
use serde_json::json;

use crate::output::Output;

pub fn load_config() -> Result<Config> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'linkvault config init' first.",
            config_file.display()
        ));
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;
    Ok(config)
}

pub fn load_credentials() -> Result<CredentialStore> {
    let path_manager = PathManager::default();
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e)
    })?;
    Ok(cred_store)
}

/// Catalog wired to the configured store, metadata provider and worker
pub fn open_catalog() -> Result<CatalogService> {
    let config = load_config()?;
    let credentials = load_credentials()?;
    let sources = SourceFactory::build(&config, &credentials)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create sources: {}", e))?;
    Ok(CatalogService::new(sources, &config.engine))
}

/// Prints a "succeeded X, failed Y" tally. An aborted batch is an error.
pub fn report_bulk(action: &str, result: &BulkResult, output: &Output) -> Result<()> {
    output.json(&json!({
        "action": action,
        "succeeded": result.succeeded,
        "failed": result.failed,
        "aborted": result.aborted,
    }));

    if let Some(reason) = &result.aborted {
        return Err(color_eyre::eyre::eyre!(
            "{} stopped, store unreachable ({}): {}",
            action,
            reason,
            result.summary()
        ));
    }
    if output.is_human() {
        if result.failed == 0 {
            output.success(format!("{}: {}", action, result.summary()));
        } else {
            output.warn(format!("{}: {}", action, result.summary()));
        }
    }
    Ok(())
}
