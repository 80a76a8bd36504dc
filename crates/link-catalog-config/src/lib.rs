pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, EngineConfig, MetadataConfig, StoreConfig, WorkerConfig};
pub use credentials::CredentialStore;
pub use paths::{ConfigLocation, PathManager, container_base_path};
