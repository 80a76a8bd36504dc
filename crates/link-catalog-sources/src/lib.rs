pub mod error;
pub mod factory;
pub mod store;
pub mod tmdb;
pub mod traits;
pub mod worker;

pub use error::SourceError;
pub use factory::{SourceFactory, Sources};
pub use store::{LinkFilter, PostgrestStore};
pub use tmdb::TmdbClient;
pub use traits::{LinkStore, MetadataProvider, ScrapeWorker};
pub use worker::{ResolveQuery, ResolvedLink, WorkerClient, WorkerReply};
