//! Per-player, per-queue rank snapshot history.
//!
//! Snapshots are immutable observations appended by the sampler and read by
//! the attributor. The persisted file per player maps queue name to an
//! ordered snapshot list; field names (`timestamp`, `elo`,
//! `league_points_raw`) are stable for compatibility with existing files.

use crate::error::AppError;
use crate::queue;
use crate::store::blob::{self, BlobStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Two polls inside this window reporting the same rank collapse into one
/// snapshot, so idle players don't flood the store.
pub const DEDUP_WINDOW_MS: i64 = 10 * 60 * 1000;

/// Deliberate retention bound; the reference behavior grew without limit.
const MAX_SNAPSHOTS_PER_QUEUE: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSnapshot {
    /// Milliseconds since epoch.
    pub timestamp: i64,
    #[serde(rename = "elo")]
    pub rank_value: i32,
    #[serde(rename = "league_points_raw")]
    pub raw_league_points: i32,
}

type SnapshotDocument = BTreeMap<String, Vec<RankSnapshot>>;

pub struct SnapshotStore<B: BlobStore> {
    blobs: Arc<B>,
}

impl<B: BlobStore> SnapshotStore<B> {
    pub fn new(blobs: Arc<B>) -> Self {
        SnapshotStore { blobs }
    }

    fn key(player: &str) -> String {
        format!("snapshots_{}", player.replace('#', "_"))
    }

    /// Appends a snapshot unless it duplicates the most recent one for this
    /// (player, queue) within the dedup window. Returns whether anything was
    /// stored; a dedup no-op also skips the persistence write.
    pub fn append(
        &self,
        player: &str,
        queue_id: i32,
        snapshot: RankSnapshot,
    ) -> Result<bool, AppError> {
        let queue_name = queue::name(queue_id).to_string();
        blob::update::<B, SnapshotDocument, _>(&self.blobs, &Self::key(player), |doc| {
            let series = doc.entry(queue_name.clone()).or_default();
            if let Some(last) = series.last() {
                if last.rank_value == snapshot.rank_value
                    && (snapshot.timestamp - last.timestamp).abs() < DEDUP_WINDOW_MS
                {
                    return false;
                }
            }
            series.push(snapshot);
            series.sort_by_key(|s| s.timestamp);
            if series.len() > MAX_SNAPSHOTS_PER_QUEUE {
                let excess = series.len() - MAX_SNAPSHOTS_PER_QUEUE;
                series.drain(..excess);
            }
            true
        })
    }

    /// All snapshots for one queue, ascending by timestamp.
    pub fn get_snapshots(&self, player: &str, queue_id: i32) -> Result<Vec<RankSnapshot>, AppError> {
        let (doc, _) =
            blob::read_document::<B, SnapshotDocument>(&self.blobs, &Self::key(player))?;
        let mut series = doc.get(queue::name(queue_id)).cloned().unwrap_or_default();
        series.sort_by_key(|s| s.timestamp);
        Ok(series)
    }

    /// Snapshot series for both ranked queues, keyed by queue id.
    pub fn get_all(&self, player: &str) -> Result<BTreeMap<i32, Vec<RankSnapshot>>, AppError> {
        let mut by_queue = BTreeMap::new();
        for queue_id in queue::RANKED_QUEUES {
            by_queue.insert(queue_id, self.get_snapshots(player, queue_id)?);
        }
        Ok(by_queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::blob::MemoryBlobStore;

    fn store() -> SnapshotStore<MemoryBlobStore> {
        SnapshotStore::new(Arc::new(MemoryBlobStore::new()))
    }

    fn snap(timestamp: i64, rank_value: i32) -> RankSnapshot {
        RankSnapshot {
            timestamp,
            rank_value,
            raw_league_points: rank_value % 100,
        }
    }

    #[test]
    fn append_then_read_back_sorted() {
        let store = store();
        store.append("p#1", queue::RANKED_SOLO, snap(2_000_000, 1210)).unwrap();
        store.append("p#1", queue::RANKED_SOLO, snap(1_000_000, 1200)).unwrap();

        let series = store.get_snapshots("p#1", queue::RANKED_SOLO).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series[0].timestamp < series[1].timestamp);
    }

    #[test]
    fn same_value_inside_window_is_dropped() {
        let store = store();
        assert!(store.append("p#1", queue::RANKED_SOLO, snap(0, 1200)).unwrap());
        // Identical rank five minutes later: no-op.
        assert!(!store
            .append("p#1", queue::RANKED_SOLO, snap(5 * 60 * 1000, 1200))
            .unwrap());
        assert_eq!(store.get_snapshots("p#1", queue::RANKED_SOLO).unwrap().len(), 1);
    }

    #[test]
    fn same_value_outside_window_is_kept() {
        let store = store();
        store.append("p#1", queue::RANKED_SOLO, snap(0, 1200)).unwrap();
        assert!(store
            .append("p#1", queue::RANKED_SOLO, snap(DEDUP_WINDOW_MS + 1, 1200))
            .unwrap());
        assert_eq!(store.get_snapshots("p#1", queue::RANKED_SOLO).unwrap().len(), 2);
    }

    #[test]
    fn changed_value_inside_window_is_kept() {
        let store = store();
        store.append("p#1", queue::RANKED_SOLO, snap(0, 1200)).unwrap();
        assert!(store.append("p#1", queue::RANKED_SOLO, snap(60_000, 1225)).unwrap());
    }

    #[test]
    fn queues_are_isolated() {
        let store = store();
        store.append("p#1", queue::RANKED_SOLO, snap(0, 1200)).unwrap();
        store.append("p#1", queue::RANKED_FLEX, snap(0, 800)).unwrap();

        assert_eq!(store.get_snapshots("p#1", queue::RANKED_SOLO).unwrap().len(), 1);
        let flex = store.get_snapshots("p#1", queue::RANKED_FLEX).unwrap();
        assert_eq!(flex.len(), 1);
        assert_eq!(flex[0].rank_value, 800);
    }

    #[test]
    fn persisted_field_names_are_stable() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let store = SnapshotStore::new(blobs.clone());
        store.append("p#1", queue::RANKED_SOLO, snap(1234, 1500)).unwrap();

        let (content, _) = blobs.read("snapshots_p_1").unwrap().unwrap();
        assert!(content.contains("\"RANKED_SOLO_5x5\""));
        assert!(content.contains("\"elo\""));
        assert!(content.contains("\"league_points_raw\""));
        assert!(content.contains("\"timestamp\""));
    }
}
