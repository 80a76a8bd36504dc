use color_eyre::Result;
use link_catalog_core::EpisodeSelection;
use link_catalog_models::{GroupKey, ItemState, ScrapeOutcome};
use serde_json::json;

use super::open_catalog;
use super::scrape_ui::ScrapeUI;
use crate::output::Output;

pub async fn run_scrape_movie(id: u64, title: &str, output: &Output) -> Result<()> {
    let catalog = open_catalog()?;
    let ui = ScrapeUI::new(output.is_human() && !output.is_quiet());
    let outcome = catalog.scrape_movie(id, title, &ui).await;
    ui.finish();
    report_outcome(&outcome, output);
    Ok(())
}

pub async fn run_scrape_movies(keys: &[GroupKey], output: &Output) -> Result<()> {
    let catalog = open_catalog()?;
    let ui = ScrapeUI::new(output.is_human() && !output.is_quiet());
    let outcome = catalog.scrape_movie_groups(keys, &ui).await?;
    ui.finish();
    report_outcome(&outcome, output);
    Ok(())
}

pub async fn run_scrape_series(
    keys: &[GroupKey],
    season: u32,
    episodes: Option<String>,
    full_season: bool,
    output: &Output,
) -> Result<()> {
    let selection = match episodes {
        Some(text) if !full_season => EpisodeSelection::Episodes(text),
        _ => EpisodeSelection::FullSeason,
    };

    let catalog = open_catalog()?;
    let ui = ScrapeUI::new(output.is_human() && !output.is_quiet());
    let outcome = catalog.scrape_series_groups(keys, season, &selection, &ui).await?;
    ui.finish();
    report_outcome(&outcome, output);
    Ok(())
}

fn report_outcome(outcome: &ScrapeOutcome, output: &Output) {
    output.json(&json!({
        "links_found": outcome.links_found,
        "attempted": outcome.attempted,
        "succeeded": outcome.succeeded_items,
        "failed_ids": outcome.failed_external_ids,
        "pending_ids": outcome.pending_external_ids,
        "items": outcome.items,
    }));
    if !output.is_human() {
        return;
    }

    for item in &outcome.items {
        if let ItemState::Failed { reason } = &item.state {
            output.warn(format!("{}: {}", item.request.label(), reason));
        }
    }
    if outcome.links_found > 0 {
        output.success(format!("Finished scraping. {}", outcome.summary()));
    } else {
        output.warn(format!("Finished scraping. {}", outcome.summary()));
    }
    if outcome.has_pending() {
        let ids: Vec<String> = outcome.pending_external_ids.iter().map(|id| id.to_string()).collect();
        output.info(format!(
            "Links for {} are not visible yet; run 'linkvault groups' again in a moment.",
            ids.join(", ")
        ));
    }
}
