//! Registry of tracked accounts, persisted as one shared blob.

use crate::error::AppError;
use crate::store::blob::{self, BlobStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const REGISTRY_KEY: &str = "players";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAccount {
    /// "GameName#TAG", the human-facing identifier and storage key.
    pub riot_id: String,
    pub puuid: String,
    pub region: String,
    pub added_at: DateTime<Utc>,
}

pub struct PlayerRegistry<B: BlobStore> {
    blobs: Arc<B>,
}

impl<B: BlobStore> PlayerRegistry<B> {
    pub fn new(blobs: Arc<B>) -> Self {
        PlayerRegistry { blobs }
    }

    /// Registers an account; re-adding the same riot id is a no-op.
    pub fn add(&self, account: PlayerAccount) -> Result<bool, AppError> {
        blob::update::<B, Vec<PlayerAccount>, _>(&self.blobs, REGISTRY_KEY, |players| {
            if players.iter().any(|p| p.riot_id == account.riot_id) {
                return false;
            }
            players.push(account.clone());
            true
        })
    }

    pub fn list(&self) -> Result<Vec<PlayerAccount>, AppError> {
        let (players, _) =
            blob::read_document::<B, Vec<PlayerAccount>>(&self.blobs, REGISTRY_KEY)?;
        Ok(players)
    }

    pub fn find(&self, riot_id: &str) -> Result<Option<PlayerAccount>, AppError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|p| p.riot_id.eq_ignore_ascii_case(riot_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::blob::MemoryBlobStore;

    fn account(riot_id: &str) -> PlayerAccount {
        PlayerAccount {
            riot_id: riot_id.to_string(),
            puuid: format!("puuid-{}", riot_id),
            region: "euw1".to_string(),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn add_and_list() {
        let registry = PlayerRegistry::new(Arc::new(MemoryBlobStore::new()));
        assert!(registry.add(account("A#EUW")).unwrap());
        assert!(registry.add(account("B#EUW")).unwrap());
        assert_eq!(registry.list().unwrap().len(), 2);
    }

    #[test]
    fn duplicate_add_is_noop() {
        let registry = PlayerRegistry::new(Arc::new(MemoryBlobStore::new()));
        assert!(registry.add(account("A#EUW")).unwrap());
        assert!(!registry.add(account("A#EUW")).unwrap());
        assert_eq!(registry.list().unwrap().len(), 1);
    }

    #[test]
    fn find_is_case_insensitive() {
        let registry = PlayerRegistry::new(Arc::new(MemoryBlobStore::new()));
        registry.add(account("Faker#KR1")).unwrap();
        assert!(registry.find("faker#kr1").unwrap().is_some());
        assert!(registry.find("Ghost#KR1").unwrap().is_none());
    }
}
