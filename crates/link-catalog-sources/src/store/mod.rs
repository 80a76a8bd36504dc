pub mod postgrest;

pub use postgrest::PostgrestStore;

/// Row filter for [`crate::LinkStore::select`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    /// Match on the collection's external id column
    pub external_content_id: Option<u64>,
    pub limit: Option<usize>,
}

impl LinkFilter {
    /// "Is there at least one row for this id?"
    pub fn first_for(external_content_id: u64) -> Self {
        Self {
            external_content_id: Some(external_content_id),
            limit: Some(1),
        }
    }
}
