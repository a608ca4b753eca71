//! Category command handlers

use anyhow::{Context, Result};

use quotebook_core::QuoteStore;

use crate::output::{capitalize, Output};

/// List categories with quote counts
pub fn list(store: &QuoteStore, output: &Output) -> Result<()> {
    let categories = counted_categories(store);
    output.print_categories(&categories, &store.selected_category());
    Ok(())
}

/// Save the category filter used by `show` and `list`
pub fn filter(store: &mut QuoteStore, category: String, output: &Output) -> Result<()> {
    let selected = store
        .set_selected_category(&category)
        .context("Failed to save category filter")?;

    let count = store.filtered_pool(&selected).len();
    if count == 0 {
        output.warning(&format!(
            "Filter set to {}, which has no quotes yet",
            capitalize(&selected)
        ));
    } else {
        output.success(&format!(
            "Filter set to {} ({} quote(s))",
            capitalize(&selected),
            count
        ));
    }

    Ok(())
}

fn counted_categories(store: &QuoteStore) -> Vec<(&str, usize)> {
    store
        .categories()
        .map(|name| (name, store.filtered_pool(name).len()))
        .collect()
}
