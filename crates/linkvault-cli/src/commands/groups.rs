use color_eyre::Result;
use comfy_table::Cell;
use link_catalog_models::{ContentGroup, ContentType};
use owo_colors::OwoColorize;
use serde_json::json;

use super::open_catalog;
use crate::output::{new_table, Output};

pub async fn run_groups(content_type: ContentType, output: &Output) -> Result<()> {
    let catalog = open_catalog()?;
    let groups = catalog
        .groups(content_type)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed loading {} links: {}", content_type, e))?;

    output.json(&json!({
        "content_type": content_type,
        "groups": groups,
    }));
    if !output.is_human() {
        return Ok(());
    }

    if groups.is_empty() {
        output.info(format!("No {} links yet.", content_type));
        return Ok(());
    }

    output.table(&groups_table(&groups));
    let links: usize = groups.iter().map(ContentGroup::link_count).sum();
    output.info(format!("{} group(s), {} link(s)", groups.len(), links));
    Ok(())
}

fn groups_table(groups: &[ContentGroup]) -> comfy_table::Table {
    let mut table = new_table(&["Key", "Title", "Links", "Poster"]);
    for group in groups {
        let key = if group.external_content_id.is_some() {
            group.key.to_string()
        } else {
            group.key.to_string().bright_black().to_string()
        };
        table.add_row(vec![
            Cell::new(key),
            Cell::new(&group.display_title),
            Cell::new(group.link_count()),
            Cell::new(group.poster_url.as_deref().unwrap_or("-")),
        ]);
    }
    table
}
