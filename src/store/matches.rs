//! Per-player ranked match history.
//!
//! A match record is created once from the match API and its three LP
//! fields start out `None`. Attribution fills them exactly once; a value
//! already present is final and is never overwritten, which is what makes
//! repeated processing passes idempotent.

use crate::error::AppError;
use crate::store::blob::{self, BlobStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub queue_id: i32,
    /// Milliseconds since epoch.
    pub game_end_timestamp: i64,
    pub win: bool,
    pub champion: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub lp_change_this_game: Option<i32>,
    pub pre_game_rank_value: Option<i32>,
    pub post_game_rank_value: Option<i32>,
}

impl MatchRecord {
    pub fn is_attributed(&self) -> bool {
        self.lp_change_this_game.is_some()
    }
}

pub struct MatchStore<B: BlobStore> {
    blobs: Arc<B>,
}

impl<B: BlobStore> MatchStore<B> {
    pub fn new(blobs: Arc<B>) -> Self {
        MatchStore { blobs }
    }

    fn key(player: &str) -> String {
        format!("matches_{}", player.replace('#', "_"))
    }

    /// Full history, most recent first.
    pub fn load(&self, player: &str) -> Result<Vec<MatchRecord>, AppError> {
        let (mut matches, _) =
            blob::read_document::<B, Vec<MatchRecord>>(&self.blobs, &Self::key(player))?;
        matches.sort_by_key(|m| std::cmp::Reverse(m.game_end_timestamp));
        Ok(matches)
    }

    /// Merges records into the stored history. New match ids are inserted;
    /// for known ids only the LP fields are touched, and only when they are
    /// still `None` (fill-once). Returns whether the blob changed.
    pub fn merge(&self, player: &str, records: &[MatchRecord]) -> Result<bool, AppError> {
        blob::update::<B, Vec<MatchRecord>, _>(&self.blobs, &Self::key(player), |stored| {
            let mut dirty = false;
            for record in records {
                match stored.iter_mut().find(|m| m.match_id == record.match_id) {
                    Some(existing) => {
                        if existing.lp_change_this_game.is_none()
                            && record.lp_change_this_game.is_some()
                        {
                            existing.lp_change_this_game = record.lp_change_this_game;
                            existing.pre_game_rank_value = record.pre_game_rank_value;
                            existing.post_game_rank_value = record.post_game_rank_value;
                            dirty = true;
                        }
                    }
                    None => {
                        stored.push(record.clone());
                        dirty = true;
                    }
                }
            }
            if dirty {
                stored.sort_by_key(|m| std::cmp::Reverse(m.game_end_timestamp));
            }
            dirty
        })
    }

    /// Exposed to the web views and records aggregation: one queue's
    /// matches, most recent first, LP fields populated where determinable.
    pub fn get_attributed_matches(
        &self,
        player: &str,
        queue_id: i32,
    ) -> Result<Vec<MatchRecord>, AppError> {
        Ok(self
            .load(player)?
            .into_iter()
            .filter(|m| m.queue_id == queue_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue;
    use crate::store::blob::MemoryBlobStore;

    pub fn record(match_id: &str, queue_id: i32, end: i64, win: bool) -> MatchRecord {
        MatchRecord {
            match_id: match_id.to_string(),
            queue_id,
            game_end_timestamp: end,
            win,
            champion: "Ahri".to_string(),
            kills: 5,
            deaths: 3,
            assists: 7,
            lp_change_this_game: None,
            pre_game_rank_value: None,
            post_game_rank_value: None,
        }
    }

    fn store() -> MatchStore<MemoryBlobStore> {
        MatchStore::new(Arc::new(MemoryBlobStore::new()))
    }

    #[test]
    fn merge_inserts_and_sorts_most_recent_first() {
        let store = store();
        store
            .merge(
                "p#1",
                &[
                    record("M1", queue::RANKED_SOLO, 100, true),
                    record("M2", queue::RANKED_SOLO, 300, false),
                ],
            )
            .unwrap();
        store
            .merge("p#1", &[record("M3", queue::RANKED_SOLO, 200, true)])
            .unwrap();

        let ids: Vec<_> = store
            .load("p#1")
            .unwrap()
            .into_iter()
            .map(|m| m.match_id)
            .collect();
        assert_eq!(ids, ["M2", "M3", "M1"]);
    }

    #[test]
    fn attribution_is_filled_exactly_once() {
        let store = store();
        store
            .merge("p#1", &[record("M1", queue::RANKED_SOLO, 100, true)])
            .unwrap();

        let mut attributed = record("M1", queue::RANKED_SOLO, 100, true);
        attributed.lp_change_this_game = Some(17);
        attributed.pre_game_rank_value = Some(1200);
        attributed.post_game_rank_value = Some(1217);
        assert!(store.merge("p#1", &[attributed]).unwrap());

        // A later pass computing a different delta must not win.
        let mut conflicting = record("M1", queue::RANKED_SOLO, 100, true);
        conflicting.lp_change_this_game = Some(-99);
        assert!(!store.merge("p#1", &[conflicting]).unwrap());

        let stored = store.load("p#1").unwrap();
        assert_eq!(stored[0].lp_change_this_game, Some(17));
        assert_eq!(stored[0].post_game_rank_value, Some(1217));
    }

    #[test]
    fn attributed_matches_filter_by_queue() {
        let store = store();
        store
            .merge(
                "p#1",
                &[
                    record("S1", queue::RANKED_SOLO, 100, true),
                    record("F1", queue::RANKED_FLEX, 200, false),
                ],
            )
            .unwrap();

        let solo = store.get_attributed_matches("p#1", queue::RANKED_SOLO).unwrap();
        assert_eq!(solo.len(), 1);
        assert_eq!(solo[0].match_id, "S1");
    }
}
