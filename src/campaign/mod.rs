// src/campaign/mod.rs
pub mod cache;
pub mod decode;

pub use cache::SnapshotCache;
pub use decode::{decode_campaign, decode_goal, uid_if_valid};

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use alloy::providers::DynProvider;
use tokio::sync::RwLock;
use tracing::debug;

use crate::abi;
use crate::error::ScholarResult;
use crate::types::Campaign;

/// Read side of the client: fetches per-campaign contract state and decodes
/// it into [`Campaign`] snapshots, with a small TTL cache in front.
#[derive(Clone)]
pub struct CampaignManager {
    provider: DynProvider,
    cache: Arc<RwLock<SnapshotCache>>,
}

impl CampaignManager {
    pub fn new(provider: DynProvider, cache_ttl_secs: u64) -> Self {
        Self {
            provider,
            cache: Arc::new(RwLock::new(SnapshotCache::new(cache_ttl_secs))),
        }
    }

    fn instance(&self, address: Address) -> abi::Campaign::CampaignInstance<DynProvider> {
        abi::Campaign::new(address, self.provider.clone())
    }

    /// Get a campaign snapshot, served from cache while fresh.
    pub async fn campaign(&self, address: Address) -> ScholarResult<Campaign> {
        {
            let cache = self.cache.read().await;
            if let Some(snapshot) = cache.get(&address) {
                return Ok(snapshot.clone());
            }
        }
        self.refresh(address).await
    }

    /// Fetch a campaign from the chain, bypassing and repopulating the cache.
    pub async fn refresh(&self, address: Address) -> ScholarResult<Campaign> {
        debug!(campaign = %address, "fetching campaign details");
        let details = self.instance(address).getCampaignDetails().call().await?;
        let campaign = decode_campaign(address, details)?;

        let mut cache = self.cache.write().await;
        cache.insert(campaign.clone());
        Ok(campaign)
    }

    /// Fetch several campaigns sequentially, e.g. a factory listing.
    pub async fn campaigns(&self, addresses: &[Address]) -> ScholarResult<Vec<Campaign>> {
        let mut campaigns = Vec::with_capacity(addresses.len());
        for address in addresses {
            campaigns.push(self.campaign(*address).await?);
        }
        Ok(campaigns)
    }

    /// Current admission attestation UID, if a genuine one is linked.
    pub async fn admission_attestation(&self, address: Address) -> ScholarResult<Option<B256>> {
        let uid = self.instance(address).admissionAttestation().call().await?;
        Ok(uid_if_valid(uid))
    }

    pub async fn is_admitted(&self, address: Address) -> ScholarResult<bool> {
        Ok(self.instance(address).isAdmitted().call().await?)
    }

    /// Remaining fundable amount for a goal, as computed by the contract.
    pub async fn fundable(&self, address: Address, goal_index: u64) -> ScholarResult<U256> {
        Ok(self
            .instance(address)
            .getFundable(U256::from(goal_index))
            .call()
            .await?)
    }

    /// Drop a cached snapshot after a state-changing transaction.
    pub async fn invalidate(&self, address: Address) {
        self.cache.write().await.invalidate(&address);
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet;

    #[test]
    fn cache_controls_do_not_touch_the_network() {
        // Nothing listens on port 1; these paths must never dial out
        let provider = wallet::read_only_provider("http://127.0.0.1:1").unwrap();
        let manager = CampaignManager::new(provider, 30);
        tokio_test::block_on(async {
            manager.invalidate(Address::ZERO).await;
            manager.clear_cache().await;
        });
    }
}
