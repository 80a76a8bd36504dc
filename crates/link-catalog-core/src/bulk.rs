use std::collections::HashMap;
use std::sync::Arc;

use link_catalog_models::{BulkResult, ContentGroup, ContentType, GroupKey, Mutation};
use link_catalog_sources::LinkStore;
use tracing::{debug, info, instrument, warn};

use crate::error::{CatalogError, Result};

/// Runs independent deletes/updates one by one, tallying each outcome.
///
/// Single failures never stop the batch. Only an unreachable store does: the
/// operations not yet tried are then counted as failed.
#[derive(Clone)]
pub struct BulkMutationCoordinator {
    store: Arc<dyn LinkStore>,
}

impl BulkMutationCoordinator {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, operations), fields(ops = operations.len()))]
    pub async fn run(&self, content_type: ContentType, operations: &[Mutation]) -> BulkResult {
        let mut result = BulkResult::default();

        for (index, op) in operations.iter().enumerate() {
            let outcome = match op {
                Mutation::Delete { id } => self.store.delete(content_type, *id).await,
                Mutation::Update { id, patch } => self.store.update(content_type, *id, patch).await,
            };

            match outcome {
                Ok(()) => {
                    debug!("{:?} on {} {} succeeded", op, content_type, op.id());
                    result.succeeded += 1;
                }
                Err(e) if e.is_unreachable() => {
                    let untried = operations.len() - index;
                    warn!("Store unreachable, abandoning {} remaining operation(s): {}", untried, e);
                    result.failed += untried;
                    result.aborted = Some(e.to_string());
                    break;
                }
                Err(e) => {
                    warn!("Operation on {} {} failed: {}", content_type, op.id(), e);
                    result.failed += 1;
                }
            }
        }

        info!("Bulk {} mutation: {}", content_type, result.summary());
        result
    }
}

/// One delete per member link of every selected group.
///
/// `groups` is the snapshot the selection was made from; keys not present in
/// it are skipped.
pub fn group_deletion_ops(groups: &[ContentGroup], selected: &[GroupKey]) -> Result<Vec<Mutation>> {
    if selected.is_empty() {
        return Err(CatalogError::EmptySelection);
    }

    let by_key: HashMap<GroupKey, &ContentGroup> = groups.iter().map(|g| (g.key, g)).collect();
    let mut ops = Vec::new();
    for key in selected {
        match by_key.get(key) {
            Some(group) => ops.extend(group.member_ids().map(|id| Mutation::Delete { id })),
            None => warn!("Group {} is not in the current listing; skipping", key),
        }
    }
    Ok(ops)
}
