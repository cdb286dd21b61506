// src/wallet.rs
//! Provider construction. Wallet custody itself stays outside the client;
//! all that lives here is turning an RPC URL (and optionally a signing key)
//! into an alloy provider.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;

use crate::error::{ScholarError, ScholarResult};

/// Provider for read-only contract calls
pub fn read_only_provider(rpc_url: &str) -> ScholarResult<DynProvider> {
    let url: reqwest::Url = rpc_url
        .parse()
        .map_err(|e| ScholarError::InvalidConfiguration(format!("Invalid RPC URL: {e}")))?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}

/// Provider with a local signer attached, plus the signer's address
pub fn signing_provider(rpc_url: &str, private_key: &str) -> ScholarResult<(DynProvider, Address)> {
    let url: reqwest::Url = rpc_url
        .parse()
        .map_err(|e| ScholarError::InvalidConfiguration(format!("Invalid RPC URL: {e}")))?;

    let signer: PrivateKeySigner = private_key
        .parse()
        .map_err(|e| ScholarError::InvalidConfiguration(format!("Invalid private key: {e}")))?;
    let sender = signer.address();
    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(url)
        .erased();

    Ok((provider, sender))
}
