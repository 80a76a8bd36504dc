use std::collections::{BTreeSet, HashMap};

use link_catalog_models::{ContentGroup, ContentMetadata, ContentType, GroupKey, LinkRecord};
use tracing::debug;

use crate::enrich::MetadataEnricher;

/// Folds records (newest first) into groups in first-seen order.
///
/// Records without an external id become singleton orphan groups, so two
/// orphans never merge even when their titles match. The input is not modified.
pub fn fold_records(records: &[LinkRecord]) -> Vec<ContentGroup> {
    let mut groups: Vec<ContentGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for record in records {
        let key = GroupKey::for_record(record);
        match index.get(&key) {
            Some(&position) => groups[position].members.push(record.clone()),
            None => {
                index.insert(key, groups.len());
                groups.push(ContentGroup {
                    key,
                    external_content_id: record.external_content_id,
                    display_title: record.fallback_title().to_string(),
                    poster_url: None,
                    members: vec![record.clone()],
                });
            }
        }
    }

    groups
}

/// Distinct external ids referenced by a set of groups
pub fn content_ids(groups: &[ContentGroup]) -> BTreeSet<u64> {
    groups.iter().filter_map(|g| g.external_content_id).collect()
}

/// Overlays enrichment results; groups without an entry keep their stored title
pub fn apply_metadata(groups: &mut [ContentGroup], metadata: &HashMap<u64, ContentMetadata>) {
    for group in groups.iter_mut() {
        let Some(found) = group.external_content_id.and_then(|id| metadata.get(&id)) else {
            continue;
        };
        if let Some(title) = found.title.as_deref().filter(|t| !t.trim().is_empty()) {
            group.display_title = title.to_string();
        }
        if found.poster_url.is_some() {
            group.poster_url = found.poster_url.clone();
        }
    }
}

/// Groups records and attaches display metadata with one enrichment pass
#[derive(Clone)]
pub struct GroupAggregator {
    enricher: MetadataEnricher,
}

impl GroupAggregator {
    pub fn new(enricher: MetadataEnricher) -> Self {
        Self { enricher }
    }

    pub async fn aggregate(&self, records: &[LinkRecord], content_type: ContentType) -> Vec<ContentGroup> {
        let mut groups = fold_records(records);
        let ids = content_ids(&groups);
        let metadata = self.enricher.enrich(&ids, content_type).await;
        apply_metadata(&mut groups, &metadata);
        debug!(
            "Aggregated {} {} record(s) into {} group(s)",
            records.len(),
            content_type,
            groups.len()
        );
        groups
    }
}
