use color_eyre::Result;
use comfy_table::Cell;
use link_catalog_models::ContentType;
use serde_json::json;

use super::open_catalog;
use crate::output::{new_table, Output};

pub async fn run_search(content_type: ContentType, query: &str, output: &Output) -> Result<()> {
    let catalog = open_catalog()?;
    let hits = catalog
        .search(query, content_type)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Search failed: {}", e))?;

    output.json(&json!({ "query": query, "results": hits }));
    if !output.is_human() {
        return Ok(());
    }

    if hits.is_empty() {
        output.warn(format!("No {} found for '{}'", content_type, query));
        return Ok(());
    }

    let mut table = new_table(&["Id", "Title", "Released"]);
    for hit in &hits {
        table.add_row(vec![
            Cell::new(hit.id),
            Cell::new(&hit.title),
            Cell::new(hit.release_date.as_deref().unwrap_or("-")),
        ]);
    }
    output.table(&table);
    Ok(())
}
