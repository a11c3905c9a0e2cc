//! Background rank sampler.
//!
//! One long-lived thread loops forever: poll every registered player's
//! current rank in both queues, encode it, and append to the snapshot
//! store. The interval is long by design to conserve the shared API quota.
//! One player failing must never starve the rest of the cycle.

use crate::api::client::RiotApiClient;
use crate::display::output::{display_error, display_info};
use crate::error::AppError;
use crate::queue;
use crate::rank;
use crate::store::blob::BlobStore;
use crate::store::players::{PlayerAccount, PlayerRegistry};
use crate::store::snapshots::{RankSnapshot, SnapshotStore};
use chrono::Utc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct Sampler<B: BlobStore> {
    client: Arc<RiotApiClient>,
    snapshots: SnapshotStore<B>,
    registry: PlayerRegistry<B>,
    interval: Duration,
}

impl<B: BlobStore + Send + Sync + 'static> Sampler<B> {
    pub fn new(client: Arc<RiotApiClient>, blobs: Arc<B>, interval: Duration) -> Self {
        Sampler {
            client,
            snapshots: SnapshotStore::new(blobs.clone()),
            registry: PlayerRegistry::new(blobs),
            interval,
        }
    }

    pub fn start(self) -> thread::JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(&self) {
        loop {
            self.poll_once();
            thread::sleep(self.interval);
        }
    }

    /// One polling cycle over every registered player. Per-player failures
    /// are logged and skipped.
    pub fn poll_once(&self) {
        let players = match self.registry.list() {
            Ok(players) => players,
            Err(e) => {
                display_error(&format!("sampler: cannot list players: {}", e));
                return;
            }
        };

        if players.is_empty() {
            return;
        }

        display_info(&format!("sampler: polling {} player(s)", players.len()));
        let mut stored = 0;
        for player in &players {
            match self.poll_player(player) {
                Ok(count) => stored += count,
                Err(e) => {
                    display_error(&format!("sampler: {} failed: {}", player.riot_id, e));
                }
            }
        }
        display_info(&format!("sampler: cycle done, {} snapshot(s) stored", stored));
    }

    fn poll_player(&self, player: &PlayerAccount) -> Result<usize, AppError> {
        let entries = self.client.get_league_entries(&player.puuid)?;
        let now = Utc::now().timestamp_millis();

        let mut stored = 0;
        for entry in entries {
            let Some(queue_id) = queue::from_name(&entry.queue_type) else {
                continue;
            };
            let snapshot = RankSnapshot {
                timestamp: now,
                rank_value: rank::encode(&entry.tier, &entry.rank, entry.league_points),
                raw_league_points: entry.league_points,
            };
            if self.snapshots.append(&player.riot_id, queue_id, snapshot)? {
                stored += 1;
            }
        }
        Ok(stored)
    }
}
