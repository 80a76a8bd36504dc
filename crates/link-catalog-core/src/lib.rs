pub mod aggregate;
pub mod bulk;
pub mod catalog;
pub mod dispatch;
pub mod enrich;
pub mod error;
pub mod import;
pub mod poller;
pub mod range;

#[cfg(test)]
mod fakes;

pub use aggregate::{fold_records, GroupAggregator};
pub use bulk::{group_deletion_ops, BulkMutationCoordinator};
pub use catalog::{CatalogService, ImportReport};
pub use dispatch::{requests_from_groups, DispatchProgress, EpisodeSelection, ScrapeDispatcher, Silent, MAX_SELECTED_EPISODES};
pub use enrich::MetadataEnricher;
pub use error::{CatalogError, Result};
pub use import::{parse_movie_csv, parse_series_csv, CsvImport, LinkResolver, ResolveReport, ResolveTarget};
pub use poller::ReconciliationPoller;
pub use range::{expand_range, selection_size};
