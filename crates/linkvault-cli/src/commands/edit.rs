use color_eyre::Result;
use link_catalog_models::{ContentType, LinkPatch};

use super::{open_catalog, report_bulk};
use crate::output::Output;

pub async fn run_edit(
    content_type: ContentType,
    id: i64,
    title: Option<String>,
    url: Option<String>,
    external_content_id: Option<Option<u64>>,
    output: &Output,
) -> Result<()> {
    let patch = LinkPatch {
        title,
        url,
        external_content_id,
    };

    let catalog = open_catalog()?;
    let result = catalog.edit_link(content_type, id, patch).await?;
    if result.failed > 0 && result.aborted.is_none() {
        output.error(format!("Link {} was not updated (it may have been deleted)", id));
    }
    report_bulk("Edit", &result, output)
}
