use color_eyre::Result;
use link_catalog_models::{ContentType, GroupKey};

use super::prompts::confirm_destructive;
use super::{open_catalog, report_bulk};
use crate::output::Output;

pub async fn run_delete_groups(content_type: ContentType, keys: &[GroupKey], yes: bool, output: &Output) -> Result<()> {
    let prompt = format!("Delete {} {} group(s) and all their links?", keys.len(), content_type);
    if !confirm_destructive(&prompt, yes)? {
        output.info("Cancelled");
        return Ok(());
    }

    let catalog = open_catalog()?;
    let result = catalog.delete_groups(content_type, keys).await?;
    report_bulk("Delete groups", &result, output)
}

pub async fn run_delete_links(content_type: ContentType, ids: &[i64], yes: bool, output: &Output) -> Result<()> {
    let prompt = format!("Delete {} {} link(s)?", ids.len(), content_type);
    if !confirm_destructive(&prompt, yes)? {
        output.info("Cancelled");
        return Ok(());
    }

    let catalog = open_catalog()?;
    let result = catalog.delete_links(content_type, ids).await?;
    report_bulk("Delete links", &result, output)
}
