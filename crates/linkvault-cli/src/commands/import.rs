use std::fs::File;
use std::path::Path;

use color_eyre::eyre::Context;
use color_eyre::Result;
use link_catalog_models::ContentType;
use serde_json::json;

use super::open_catalog;
use crate::output::Output;

pub async fn run_import(content_type: ContentType, csv: &Path, output: &Output) -> Result<()> {
    let file = File::open(csv).with_context(|| format!("Failed to open {}", csv.display()))?;

    let catalog = open_catalog()?;
    let report = catalog.import_csv(content_type, file).await?;

    output.json(&json!({ "inserted": report.inserted, "skipped": report.skipped }));
    if report.skipped > 0 {
        output.warn(format!("Skipped {} incomplete row(s)", report.skipped));
    }
    output.success(format!("Added {} link(s)", report.inserted));
    Ok(())
}
