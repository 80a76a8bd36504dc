use color_eyre::Result;
use link_catalog_models::ContentType;
use serde_json::json;

use super::open_catalog;
use crate::output::Output;

pub async fn run_resolve(
    content_type: ContentType,
    ids: &[u64],
    season: Option<u32>,
    episode: Option<u32>,
    output: &Output,
) -> Result<()> {
    if content_type == ContentType::Movie && (season.is_some() || episode.is_some()) {
        output.warn("--season/--episode only apply to series; ignoring");
    }

    let catalog = open_catalog()?;
    let report = catalog.resolve_ids(content_type, ids, season, episode).await?;

    output.json(&json!(report));
    for title in &report.skipped {
        output.warn(format!("No link found for {}", title));
    }
    if report.inserted > 0 {
        output.success(format!("Added {} link(s)", report.inserted));
    } else {
        output.error("No links resolved");
    }
    Ok(())
}
