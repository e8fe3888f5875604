//! Cluster identifiers and the set of clusters believed to be syncing

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque identifier of a managed cluster
///
/// The dashboard backend emits numeric primary keys, but nothing on this
/// side relies on that, so the ID is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClusterId(pub String);

impl ClusterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClusterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClusterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for ClusterId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for ClusterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from(n),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Clusters currently believed to be syncing
///
/// Membership is the only state the coordinator keeps about sync jobs.
/// It is never persisted.
#[derive(Debug, Clone, Default)]
pub struct SyncSet {
    ids: HashSet<ClusterId>,
}

impl SyncSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ClusterId) -> bool {
        self.ids.contains(id)
    }

    /// Returns `false` if the cluster was already present
    pub fn insert(&mut self, id: ClusterId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &ClusterId) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterId> {
        self.ids.iter()
    }
}

impl Extend<ClusterId> for SyncSet {
    fn extend<I: IntoIterator<Item = ClusterId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_id_from_number_or_string() {
        let numeric: ClusterId = serde_json::from_str("7").unwrap();
        let text: ClusterId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(numeric, text);
        assert_eq!(numeric.as_str(), "7");
    }

    #[test]
    fn test_cluster_id_rejects_other_json() {
        assert!(serde_json::from_str::<ClusterId>("true").is_err());
        assert!(serde_json::from_str::<ClusterId>("null").is_err());
    }

    #[test]
    fn test_sync_set_bulk_union_ignores_duplicates() {
        let mut set = SyncSet::new();
        assert!(set.insert(ClusterId::new("c1")));
        assert!(!set.insert(ClusterId::new("c1")));

        set.extend(["c1", "c2", "c3"].into_iter().map(ClusterId::from));
        assert_eq!(set.len(), 3);
        assert!(set.contains(&ClusterId::new("c2")));
    }

    #[test]
    fn test_sync_set_remove_and_clear() {
        let mut set = SyncSet::new();
        set.extend(["a", "b"].into_iter().map(ClusterId::from));

        assert!(set.remove(&ClusterId::new("a")));
        assert!(!set.remove(&ClusterId::new("a")));
        set.clear();
        assert!(set.is_empty());
    }
}
