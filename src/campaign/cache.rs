// src/campaign/cache.rs
use std::collections::HashMap;

use alloy::primitives::Address;

use crate::types::Campaign;

/// Snapshot cache for decoded campaign state. Entries expire after a TTL;
/// everything here can be re-derived from the chain at any time.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    cache: HashMap<Address, Campaign>,
    ttl_seconds: u64,
}

impl SnapshotCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            cache: HashMap::new(),
            ttl_seconds,
        }
    }

    pub fn insert(&mut self, campaign: Campaign) {
        self.cache.insert(campaign.address, campaign);
    }

    pub fn get(&self, address: &Address) -> Option<&Campaign> {
        self.cache.get(address).filter(|c| !self.is_expired(c))
    }

    pub fn invalidate(&mut self, address: &Address) {
        self.cache.remove(address);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn is_expired(&self, campaign: &Campaign) -> bool {
        let age = chrono::Utc::now() - campaign.fetched_at;
        age.num_seconds() >= self.ttl_seconds as i64
    }
}
