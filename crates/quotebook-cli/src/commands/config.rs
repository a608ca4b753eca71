//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use quotebook_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str = "data_dir, remote_url, sync_enabled, sync_interval_secs, \
                          initial_sync_delay_secs, fetch_limit, offline, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&config).context("Failed to serialize configuration")?
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:                {}", config.data_dir.display());
            println!("  remote_url:              {}", config.remote_url);
            println!("  sync_enabled:            {}", config.sync_enabled);
            println!("  sync_interval_secs:      {}", config.sync_interval_secs);
            println!(
                "  initial_sync_delay_secs: {}",
                config.initial_sync_delay_secs
            );
            println!("  fetch_limit:             {}", config.fetch_limit);
            println!("  offline:                 {}", config.offline);
            println!(
                "  log_file:                {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "remote_url" => {
            if value.is_empty() {
                bail!("remote_url cannot be empty. Use 'sync_enabled false' to stop syncing.");
            }
            config.remote_url = value.to_string();
        }
        "sync_enabled" => {
            config.sync_enabled = value
                .parse()
                .context("Invalid value for sync_enabled. Use 'true' or 'false'.")?;
        }
        "sync_interval_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for sync_interval_secs. Use a number of seconds.")?;
            if secs == 0 {
                bail!("sync_interval_secs must be at least 1");
            }
            config.sync_interval_secs = secs;
        }
        "initial_sync_delay_secs" => {
            config.initial_sync_delay_secs = value
                .parse()
                .context("Invalid value for initial_sync_delay_secs. Use a number of seconds.")?;
        }
        "fetch_limit" => {
            let limit: usize = value
                .parse()
                .context("Invalid value for fetch_limit. Use a positive number.")?;
            if limit == 0 {
                bail!("fetch_limit must be at least 1");
            }
            config.fetch_limit = limit;
        }
        "offline" => {
            config.offline = value
                .parse()
                .context("Invalid value for offline. Use 'true' or 'false'.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }

    Ok(())
}
