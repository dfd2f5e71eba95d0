use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::event_store::StoreError;

// ============================================================================
// Snapshot Store - Materialized Aggregate State
// ============================================================================
//
// Snapshots let a collaborator rehydrate an aggregate without replaying its
// whole history; only events after `version` need to be applied.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<S> {
    pub aggregate_id: String,
    pub version: u64,
    pub state: S,
    pub taken_at: DateTime<Utc>,
}

impl<S> Snapshot<S> {
    pub fn new(aggregate_id: impl Into<String>, version: u64, state: S) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            version,
            state,
            taken_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait SnapshotStore<S>: Send + Sync
where
    S: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Store a snapshot; older versions never overwrite newer ones
    async fn save_snapshot(&self, snapshot: Snapshot<S>) -> Result<(), StoreError>;

    async fn load_snapshot(&self, aggregate_id: &str) -> Result<Option<Snapshot<S>>, StoreError>;
}

#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: RwLock<HashMap<String, (u64, String)>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<S> SnapshotStore<S> for InMemorySnapshotStore
where
    S: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn save_snapshot(&self, snapshot: Snapshot<S>) -> Result<(), StoreError> {
        let json = serde_json::to_string(&snapshot)?;
        let mut snapshots = self.snapshots.write().await;

        if let Some((stored_version, _)) = snapshots.get(&snapshot.aggregate_id) {
            if *stored_version >= snapshot.version {
                tracing::debug!(
                    aggregate_id = %snapshot.aggregate_id,
                    stored_version = *stored_version,
                    offered_version = snapshot.version,
                    "Skipping stale snapshot"
                );
                return Ok(());
            }
        }

        tracing::debug!(
            aggregate_id = %snapshot.aggregate_id,
            version = snapshot.version,
            "Saved snapshot"
        );
        snapshots.insert(snapshot.aggregate_id.clone(), (snapshot.version, json));
        Ok(())
    }

    async fn load_snapshot(&self, aggregate_id: &str) -> Result<Option<Snapshot<S>>, StoreError> {
        let snapshots = self.snapshots.read().await;
        match snapshots.get(aggregate_id) {
            Some((_, json)) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tally {
        count: u32,
    }

    #[tokio::test]
    async fn test_save_and_load_snapshot() {
        let store = InMemorySnapshotStore::new();
        store
            .save_snapshot(Snapshot::new("t-1", 3, Tally { count: 3 }))
            .await
            .unwrap();

        let loaded: Snapshot<Tally> = store.load_snapshot("t-1").await.unwrap().unwrap();
        assert_eq!(loaded.version, 3);
        assert_eq!(loaded.state, Tally { count: 3 });
    }

    #[tokio::test]
    async fn test_stale_snapshot_ignored() {
        let store = InMemorySnapshotStore::new();
        store
            .save_snapshot(Snapshot::new("t-1", 5, Tally { count: 5 }))
            .await
            .unwrap();
        store
            .save_snapshot(Snapshot::new("t-1", 2, Tally { count: 2 }))
            .await
            .unwrap();

        let loaded: Snapshot<Tally> = store.load_snapshot("t-1").await.unwrap().unwrap();
        assert_eq!(loaded.version, 5);
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let store = InMemorySnapshotStore::new();
        let loaded: Option<Snapshot<Tally>> = store.load_snapshot("nope").await.unwrap();
        assert!(loaded.is_none());
    }
}
