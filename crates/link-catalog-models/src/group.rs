use crate::LinkRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ORPHAN_PREFIX: &str = "orphan-";

/// Identity of a content group.
///
/// Records without an external content id get a singleton group keyed by
/// their own record id, prefixed so it cannot collide with a content id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GroupKey {
    Content(u64),
    Orphan(i64),
}

impl GroupKey {
    pub fn for_record(record: &LinkRecord) -> Self {
        match record.external_content_id {
            Some(id) => GroupKey::Content(id),
            None => GroupKey::Orphan(record.id),
        }
    }

    pub fn content_id(&self) -> Option<u64> {
        match self {
            GroupKey::Content(id) => Some(*id),
            GroupKey::Orphan(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Content(id) => write!(f, "{}", id),
            GroupKey::Orphan(record_id) => write!(f, "{}{}", ORPHAN_PREFIX, record_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupKeyParseError(pub String);

impl fmt::Display for GroupKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid group key: {}", self.0)
    }
}

impl std::error::Error for GroupKeyParseError {}

impl FromStr for GroupKey {
    type Err = GroupKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix(ORPHAN_PREFIX) {
            return rest
                .parse::<i64>()
                .map(GroupKey::Orphan)
                .map_err(|_| GroupKeyParseError(s.to_string()));
        }
        s.parse::<u64>()
            .map(GroupKey::Content)
            .map_err(|_| GroupKeyParseError(s.to_string()))
    }
}

impl From<GroupKey> for String {
    fn from(key: GroupKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for GroupKey {
    type Error = GroupKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Derived, never-persisted view over the links of one movie or series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentGroup {
    pub key: GroupKey,
    pub external_content_id: Option<u64>,
    pub display_title: String,
    pub poster_url: Option<String>,
    /// Members in the order they were received (newest first)
    pub members: Vec<LinkRecord>,
}

impl ContentGroup {
    pub fn link_count(&self) -> usize {
        self.members.len()
    }

    pub fn member_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.members.iter().map(|m| m.id)
    }
}
