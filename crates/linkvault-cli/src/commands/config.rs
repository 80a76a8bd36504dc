use color_eyre::Result;
use comfy_table::{Cell, Table};
use link_catalog_config::{Config, CredentialStore, PathManager};
use owo_colors::OwoColorize;
use serde_json::json;

use super::load_credentials;
use super::prompts::{prompt_secret, prompt_string};
use super::scrape_ui::is_interactive;
use crate::output::{new_table, Output};

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output),
        crate::ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn secret_display(value: Option<String>, full: bool) -> String {
    match value {
        Some(v) if full => v,
        Some(v) => mask_string(&v),
        None => "not set".bright_black().to_string(),
    }
}

fn section(title: &str, rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(title)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(comfy_table::Attribute::Bold)]);
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'linkvault config init' to create one.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let credentials = load_credentials()?;

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "config_location": path_manager.location().to_string(),
            "config": config,
            "credentials": {
                "store_api_key": credentials.store_api_key().is_some(),
                "tmdb_api_key": credentials.tmdb_api_key().is_some(),
                "worker_token": credentials.worker_token().is_some(),
            },
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    let mut info_table = new_table(&["Config File", &config_file.display().to_string()]);
    info_table.add_row(vec![
        Cell::new("Credentials File"),
        Cell::new(path_manager.credentials_file().display().to_string()),
    ]);
    info_table.add_row(vec![Cell::new("Found Via"), Cell::new(path_manager.location().to_string())]);
    output.table(&info_table);

    output.table(&section(
        "Data Store",
        vec![
            ("URL", config.store.url.clone()),
            ("Movie table", config.store.movie_table.clone()),
            ("Series table", config.store.series_table.clone()),
            ("API key", secret_display(credentials.store_api_key(), full)),
        ],
    ));
    output.table(&section(
        "Metadata (TMDB)",
        vec![
            ("Base URL", config.metadata.base_url.clone()),
            ("Image base URL", config.metadata.image_base_url.clone()),
            ("Language", config.metadata.language.clone()),
            ("API key", secret_display(credentials.tmdb_api_key(), full)),
        ],
    ));
    output.table(&section(
        "Scrape Worker",
        vec![
            ("Base URL", config.worker.base_url.clone()),
            ("Token", secret_display(credentials.worker_token(), full)),
        ],
    ));
    output.table(&section(
        "Engine",
        vec![
            ("Poll attempts", config.engine.poll_attempts.to_string()),
            ("Poll delay", format!("{} ms", config.engine.poll_delay_ms)),
            ("Metadata timeout", format!("{} s", config.engine.metadata_timeout_secs)),
            ("Resolve timeout", format!("{} s", config.engine.resolve_timeout_secs)),
            ("Full season length", config.engine.full_season_episodes.to_string()),
        ],
    ));

    match config.validate() {
        Ok(()) => output.success("Configuration is valid"),
        Err(e) => output.warn(format!("Configuration is incomplete: {}", e)),
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create config directories: {}", e))?;
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        return Err(color_eyre::eyre::eyre!(
            "{} already exists; pass --force to overwrite it",
            config_file.display()
        ));
    }

    let mut config = Config::template();
    if is_interactive() && output.is_human() {
        config.store.url = prompt_string("Data store URL (e.g. https://abc.supabase.co)", Some(config.store.url.as_str()))?;
        config.worker.base_url = prompt_string("Scrape worker URL", Some(config.worker.base_url.as_str()))?;

        let mut credentials = CredentialStore::new(path_manager.credentials_file());
        credentials
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
        if let Some(key) = prompt_secret("Data store API key (blank to keep)")? {
            credentials.set_store_api_key(key);
        }
        if let Some(key) = prompt_secret("TMDB API key (blank to keep)")? {
            credentials.set_tmdb_api_key(key);
        }
        if let Some(token) = prompt_secret("Scrape worker token (blank to keep)")? {
            credentials.set_worker_token(token);
        }
        credentials
            .save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;
    } else {
        output.info("Non-interactive mode: writing a template; set secrets via LINKVAULT_STORE_KEY, LINKVAULT_TMDB_KEY and LINKVAULT_WORKER_TOKEN.");
    }

    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write {}: {}", config_file.display(), e))?;
    output.success(format!("Configuration written to {}", config_file.display()));

    if let Err(e) = config.validate() {
        output.warn(format!("Edit the file before use: {}", e));
    }
    Ok(())
}
