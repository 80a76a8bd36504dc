pub mod bulk;
pub mod content;
pub mod group;
pub mod link;
pub mod metadata;
pub mod scrape;

pub use bulk::{BulkResult, LinkPatch, Mutation};
pub use content::ContentType;
pub use group::{ContentGroup, GroupKey, GroupKeyParseError};
pub use link::{LinkRecord, NewLink};
pub use metadata::{ContentMetadata, SearchHit};
pub use scrape::{ItemState, ScrapeItemReport, ScrapeOutcome, ScrapeRequest};
