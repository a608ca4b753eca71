//! Status command handler

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use quotebook_core::{Config, QuoteSource, QuoteStore};

use crate::output::{capitalize, Output, OutputFormat};

/// Show status information
pub fn show(store: &QuoteStore, config: &Config, online: bool, output: &Output) -> Result<()> {
    let total = store.len();
    let from_server = store
        .quotes()
        .iter()
        .filter(|q| q.source == QuoteSource::Server)
        .count();
    let categories = store.categories().count();
    let selected = store.selected_category();
    let last_sync = store.last_sync();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "quotes": {
                        "total": total,
                        "local": total - from_server,
                        "server": from_server
                    },
                    "categories": categories,
                    "selected_category": selected,
                    "sync": {
                        "enabled": config.sync_enabled,
                        "remote_url": config.remote_url,
                        "online": online,
                        "interval_secs": config.sync_interval_secs,
                        "last_sync": last_sync.map(|t| t.to_rfc3339())
                    },
                    "data_dir": config.data_dir
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", total);
        }
        OutputFormat::Human => {
            println!("Quotebook Status");
            println!("================");
            println!();
            println!("Quotes:");
            println!("  Total:      {}", total);
            println!("  Local:      {}", total - from_server);
            println!("  Server:     {}", from_server);
            println!("  Categories: {}", categories);
            println!("  Filter:     {}", capitalize(&selected));
            println!();
            println!("Sync:");
            println!(
                "  Status:    {}",
                if !config.sync_enabled {
                    "disabled"
                } else if online {
                    "online"
                } else {
                    "offline"
                }
            );
            println!("  Server:    {}", config.remote_url);
            println!("  Interval:  {}s", config.sync_interval_secs);
            println!("  Last sync: {}", format_last_sync(last_sync));
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
        }
    }

    Ok(())
}

fn format_last_sync(last_sync: Option<DateTime<Utc>>) -> String {
    match last_sync {
        Some(at) => at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_last_sync_never() {
        assert_eq!(format_last_sync(None), "never");
    }

    #[test]
    fn test_format_last_sync_timestamp() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let formatted = format_last_sync(Some(at));
        assert_eq!(formatted.len(), "2024-03-01 12:00:00".len());
        assert!(formatted.starts_with("2024-0"));
    }
}
