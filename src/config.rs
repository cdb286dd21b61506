// src/config.rs
use alloy::primitives::{Address, B256};

use crate::error::{ScholarError, ScholarResult};

/// Everything the client needs to talk to one deployment of the
/// onchain-scholar contracts.
#[derive(Debug, Clone)]
pub struct ScholarConfig {
    /// HTTP JSON-RPC endpoint
    pub rpc_url: String,
    /// Chain the contracts are deployed on; verified by `health_check`
    pub chain_id: u64,
    pub factory_address: Address,
    /// EAS registry the campaign contracts point at
    pub eas_address: Address,
    /// Mock IDRX token used for funding
    pub erc20_address: Address,
    /// Single schema UID covering admission and goal attestations
    pub admission_schema_uid: B256,
    /// Hex-encoded signing key for transaction submission
    pub private_key: String,
    /// How long campaign snapshots stay fresh
    pub cache_ttl_secs: u64,
}

impl ScholarConfig {
    /// Load configuration from `SCHOLAR_*` environment variables.
    pub fn from_env() -> ScholarResult<Self> {
        Ok(ScholarConfig {
            rpc_url: env_var("SCHOLAR_RPC_URL")
                .unwrap_or_else(|_| "http://localhost:8545".to_string()),
            chain_id: env_var("SCHOLAR_CHAIN_ID")
                .unwrap_or_else(|_| "31337".to_string())
                .parse()
                .map_err(|_| {
                    ScholarError::InvalidConfiguration("Invalid SCHOLAR_CHAIN_ID".to_string())
                })?,
            factory_address: parse_address(&env_var("SCHOLAR_FACTORY_ADDRESS")?)?,
            eas_address: parse_address(&env_var("SCHOLAR_EAS_ADDRESS")?)?,
            erc20_address: parse_address(&env_var("SCHOLAR_ERC20_ADDRESS")?)?,
            admission_schema_uid: parse_uid(&env_var("SCHOLAR_SCHEMA_UID")?)?,
            private_key: env_var("SCHOLAR_PRIVATE_KEY")?,
            cache_ttl_secs: env_var("SCHOLAR_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    ScholarError::InvalidConfiguration("Invalid SCHOLAR_CACHE_TTL_SECS".to_string())
                })?,
        })
    }
}

fn env_var(key: &str) -> ScholarResult<String> {
    std::env::var(key).map_err(|_| ScholarError::MissingConfigurationKey(key.to_string()))
}

/// Parse a `0x`-prefixed address string
pub fn parse_address(value: &str) -> ScholarResult<Address> {
    value
        .parse()
        .map_err(|_| ScholarError::InvalidAddress(value.to_string()))
}

/// Parse a `0x`-prefixed 32-byte attestation or schema UID
pub fn parse_uid(value: &str) -> ScholarResult<B256> {
    value
        .parse()
        .map_err(|_| ScholarError::InvalidAttestationUid(value.to_string()))
}
