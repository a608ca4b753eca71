//! Quote command handlers

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use quotebook_core::models::normalize_category;
use quotebook_core::sync::SyncEngine;
use quotebook_core::{Config, QuoteStore, Selection, ALL_CATEGORIES};

use crate::output::Output;
use crate::prompt::confirm;

/// Export target meaning standard output
pub const STDOUT_PATH: &str = "-";

/// Show a random quote from a category, or from the saved filter
pub fn show(store: &QuoteStore, category: Option<String>, output: &Output) -> Result<()> {
    let category = resolve_category(store, category);

    match store.random_quote(&category, &mut rand::thread_rng()) {
        Selection::Quote(quote) => output.print_quote(quote),
        Selection::Empty { category } => output.message(&Selection::empty_message(&category)),
    }

    Ok(())
}

/// List quotes in a category, or under the saved filter
pub fn list(store: &QuoteStore, category: Option<String>, output: &Output) -> Result<()> {
    let category = resolve_category(store, category);
    let pool = store.filtered_pool(&category);

    if pool.is_empty() && !output.is_json() {
        output.message(&Selection::empty_message(&category));
        return Ok(());
    }

    output.print_quotes(&pool);
    Ok(())
}

/// Add a quote, then offer it to the server
///
/// The local add stands even when the push fails.
pub async fn add(
    engine: &SyncEngine,
    config: &Config,
    text: String,
    category: String,
    output: &Output,
) -> Result<()> {
    let quote = {
        let mut store = engine.store().lock().await;
        store.add(&text, &category)?
    };

    if !config.sync_active() {
        output.success(&format!("Added quote to {}", quote.category));
        return Ok(());
    }

    if !engine.connectivity().is_online() {
        output.success(&format!(
            "Added quote to {} (offline, not sent to the server)",
            quote.category
        ));
        return Ok(());
    }

    match engine.push_quote(&quote).await {
        Ok(()) => output.success(&format!(
            "Added quote to {} and sent it to the server",
            quote.category
        )),
        Err(e) => output.warning(&format!(
            "Added quote to {}, but sending it to the server failed: {}",
            quote.category, e
        )),
    }

    Ok(())
}

/// Import quotes from a JSON file
pub fn import(store: &mut QuoteStore, path: &Path, output: &Output) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;

    let count = store
        .import_json(&content)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    output.success(&format!("Imported {} quote(s)", count));
    Ok(())
}

/// Export all quotes as pretty-printed JSON
pub fn export(store: &QuoteStore, path: &Path, output: &Output) -> Result<()> {
    let json = store.export_json()?;

    if path == Path::new(STDOUT_PATH) {
        println!("{}", json);
        return Ok(());
    }

    fs::write(path, json)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    output.success(&format!(
        "Exported {} quote(s) to {}",
        store.len(),
        path.display()
    ));
    Ok(())
}

/// Replace the collection with the default quotes
pub fn reset(store: &mut QuoteStore, yes: bool, output: &Output) -> Result<()> {
    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to reset without --yes");
        }
        println!(
            "This replaces all {} quote(s) with the default set.",
            store.len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.reset().context("Failed to reset quotes")?;

    output.success(&format!("Restored {} default quotes", store.len()));
    Ok(())
}

/// Default export file
pub fn default_export_path() -> PathBuf {
    PathBuf::from("quotes.json")
}

fn resolve_category(store: &QuoteStore, category: Option<String>) -> String {
    match category.map(|c| normalize_category(&c)) {
        Some(c) if c.is_empty() => ALL_CATEGORIES.to_string(),
        Some(c) => c,
        None => store.selected_category(),
    }
}
