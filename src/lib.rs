// src/lib.rs
//! Client library for the onchain-scholar scholarship-crowdfunding
//! contracts. Mirrors the on-chain Campaign/Goal lifecycle into typed
//! snapshots and drives the funding and attestation transaction workflows
//! the web frontend used to perform. Business rules live in the contracts;
//! this client reads them, formats them, and submits transactions.

pub mod abi;
pub mod attestation;
pub mod campaign;
pub mod config;
pub mod error;
pub mod factory;
pub mod funding;
pub mod types;
pub mod wallet;

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider};
use tracing::info;

use crate::attestation::{AttestationManager, OnchainEas};
use crate::campaign::CampaignManager;
use crate::config::ScholarConfig;
use crate::error::{ScholarError, ScholarResult};
use crate::factory::FactoryManager;
use crate::funding::{FundingManager, OnchainFunding};

/// One connected client: a signing provider plus the per-concern managers.
#[derive(Clone)]
pub struct ScholarClient {
    config: ScholarConfig,
    provider: DynProvider,
    sender: Address,
    campaigns: CampaignManager,
    factory: FactoryManager,
    funding: FundingManager,
    attestations: AttestationManager,
}

impl ScholarClient {
    /// Build a client from configuration. No network traffic happens here;
    /// the first contract call does.
    pub fn connect(config: ScholarConfig) -> ScholarResult<Self> {
        let (provider, sender) = wallet::signing_provider(&config.rpc_url, &config.private_key)?;

        let campaigns = CampaignManager::new(provider.clone(), config.cache_ttl_secs);
        let factory = FactoryManager::new(provider.clone(), config.factory_address);
        let gateway = Arc::new(OnchainFunding::new(provider.clone(), config.erc20_address));
        let funding = FundingManager::new(gateway, config.erc20_address, sender);
        let registry = Arc::new(OnchainEas::new(provider.clone(), config.eas_address));
        let attestations =
            AttestationManager::new(registry, provider.clone(), config.admission_schema_uid);

        info!(sender = %sender, factory = %config.factory_address, "scholar client ready");

        Ok(Self {
            config,
            provider,
            sender,
            campaigns,
            factory,
            funding,
            attestations,
        })
    }

    /// Address transactions are signed with
    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn config(&self) -> &ScholarConfig {
        &self.config
    }

    /// Campaign reads and decoding
    pub fn campaigns(&self) -> &CampaignManager {
        &self.campaigns
    }

    /// Factory operations (create, list)
    pub fn factory(&self) -> &FactoryManager {
        &self.factory
    }

    /// Token allowance/approve/fund workflow
    pub fn funding(&self) -> &FundingManager {
        &self.funding
    }

    /// EAS attest/revoke workflows
    pub fn attestations(&self) -> &AttestationManager {
        &self.attestations
    }

    /// Verify the node is on the configured chain and the factory address
    /// actually holds code.
    pub async fn health_check(&self) -> ScholarResult<()> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| ScholarError::Rpc(e.to_string()))?;
        if chain_id != self.config.chain_id {
            return Err(ScholarError::WrongChain {
                expected: self.config.chain_id,
                actual: chain_id,
            });
        }

        let code = self
            .provider
            .get_code_at(self.config.factory_address)
            .await
            .map_err(|e| ScholarError::Rpc(e.to_string()))?;
        if code.is_empty() {
            return Err(ScholarError::NoContractCode(self.config.factory_address));
        }

        Ok(())
    }
}
