use color_eyre::eyre::Context;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use flickbox_config::{resolve_api_key, Config, CredentialStore, Paths};

use crate::output::{Output, OutputFormat};

fn mask(secret: &str) -> String {
    if secret.len() <= 4 {
        return "****".to_string();
    }
    format!("{}****", &secret[..4])
}

pub fn run_show(paths: &Paths, config: &Config, output: &Output) -> Result<()> {
    let mut store = CredentialStore::new(paths.credentials_file());
    store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let api_key = resolve_api_key(&store);

    if output.format() != OutputFormat::Human {
        output.json(&serde_json::json!({
            "config_file": paths.config_file(),
            "watchlist_file": paths.watchlist_file(),
            "catalog_base_url": config.catalog.base_url,
            "list_ttl_minutes": config.cache.list_ttl_minutes,
            "genre_ttl_hours": config.cache.genre_ttl_hours,
            "api_key_configured": api_key.is_some(),
        }));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Config file"),
        Cell::new(paths.config_file().display()),
    ]);
    table.add_row(vec![
        Cell::new("Watchlist file"),
        Cell::new(paths.watchlist_file().display()),
    ]);
    table.add_row(vec![
        Cell::new("Catalog base URL"),
        Cell::new(&config.catalog.base_url),
    ]);
    table.add_row(vec![
        Cell::new("List cache TTL"),
        Cell::new(format!("{} min", config.cache.list_ttl_minutes)),
    ]);
    table.add_row(vec![
        Cell::new("Genre cache TTL"),
        Cell::new(format!("{} h", config.cache.genre_ttl_hours)),
    ]);
    table.add_row(vec![
        Cell::new("TMDB API key"),
        Cell::new(api_key.as_deref().map_or("(not set)".to_string(), mask)),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.info(table.to_string());
    Ok(())
}

/// Store the TMDB API key in the credential file. Prompts without echo when
/// the key is not passed on the command line.
pub fn run_key(paths: &Paths, key: Option<String>, output: &Output) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => rpassword::prompt_password("TMDB API key: ").context("reading API key")?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        output.error("No API key entered");
        return Ok(());
    }

    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create config directory: {}", e))?;
    let mut store = CredentialStore::new(paths.credentials_file());
    store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    store.set_tmdb_api_key(key);
    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;
    output.success(format!(
        "API key saved to {}",
        paths.credentials_file().display()
    ));
    Ok(())
}

pub fn run_clear(paths: &Paths, output: &Output) -> Result<()> {
    let credentials_file = paths.credentials_file();
    if credentials_file.exists() {
        std::fs::remove_file(&credentials_file)
            .with_context(|| format!("removing {}", credentials_file.display()))?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }
    Ok(())
}
