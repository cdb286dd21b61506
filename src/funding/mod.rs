// src/funding/mod.rs
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use alloy::providers::DynProvider;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::abi;
use crate::error::{ScholarError, ScholarResult};
use crate::types::{FundingOutcome, format_token_amount};

/// Seam over the token and campaign calls the funding sequence makes, so
/// the approve/fund ordering can be exercised against a mock.
#[async_trait]
pub trait FundingGateway: Send + Sync {
    async fn balance_of(&self, account: Address) -> ScholarResult<U256>;

    async fn allowance(&self, owner: Address, spender: Address) -> ScholarResult<U256>;

    /// Submit an approval and wait for its receipt, returning the tx hash
    async fn approve(&self, spender: Address, amount: U256) -> ScholarResult<B256>;

    /// Submit the fund call and wait for its receipt, returning the tx hash
    async fn fund(&self, campaign: Address, goal_index: u64, amount: U256)
    -> ScholarResult<B256>;

    async fn decimals(&self) -> ScholarResult<u8>;

    async fn symbol(&self) -> ScholarResult<String>;

    async fn mint(&self, to: Address, amount: U256) -> ScholarResult<B256>;
}

/// The real token and campaign contracts
pub struct OnchainFunding {
    provider: DynProvider,
    token: Address,
}

impl OnchainFunding {
    pub fn new(provider: DynProvider, token: Address) -> Self {
        Self { provider, token }
    }

    fn token_instance(&self) -> abi::IERC20::IERC20Instance<DynProvider> {
        abi::IERC20::new(self.token, self.provider.clone())
    }

    fn campaign_instance(&self, address: Address) -> abi::Campaign::CampaignInstance<DynProvider> {
        abi::Campaign::new(address, self.provider.clone())
    }
}

#[async_trait]
impl FundingGateway for OnchainFunding {
    async fn balance_of(&self, account: Address) -> ScholarResult<U256> {
        Ok(self.token_instance().balanceOf(account).call().await?)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> ScholarResult<U256> {
        Ok(self
            .token_instance()
            .allowance(owner, spender)
            .call()
            .await?)
    }

    async fn approve(&self, spender: Address, amount: U256) -> ScholarResult<B256> {
        let receipt = self
            .token_instance()
            .approve(spender, amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            return Err(ScholarError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt.transaction_hash)
    }

    async fn fund(
        &self,
        campaign: Address,
        goal_index: u64,
        amount: U256,
    ) -> ScholarResult<B256> {
        let receipt = self
            .campaign_instance(campaign)
            .fund(U256::from(goal_index), amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            return Err(ScholarError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt.transaction_hash)
    }

    async fn decimals(&self) -> ScholarResult<u8> {
        Ok(self.token_instance().decimals().call().await?)
    }

    async fn symbol(&self) -> ScholarResult<String> {
        Ok(self.token_instance().symbol().call().await?)
    }

    async fn mint(&self, to: Address, amount: U256) -> ScholarResult<B256> {
        let receipt = self
            .token_instance()
            .mint(to, amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            return Err(ScholarError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt.transaction_hash)
    }
}

/// The allowance/approve/fund sequence against a campaign contract, plus
/// conveniences for the mock IDRX token it is funded with.
///
/// The approve and fund transactions are sequential with no atomicity
/// between them. A fund failure after a confirmed approval leaves the
/// allowance standing; that state is reported as
/// [`ScholarError::ApprovalStranded`] so the caller can re-trigger.
#[derive(Clone)]
pub struct FundingManager {
    gateway: Arc<dyn FundingGateway>,
    token: Address,
    /// Address the attached signer submits from; allowance checks use it
    sender: Address,
}

impl FundingManager {
    pub fn new(gateway: Arc<dyn FundingGateway>, token: Address, sender: Address) -> Self {
        Self {
            gateway,
            token,
            sender,
        }
    }

    pub fn token_address(&self) -> Address {
        self.token
    }

    /// Fund a goal. Checks the token allowance toward the campaign first and
    /// submits an approval when it falls short, then submits the fund call.
    pub async fn fund(
        &self,
        campaign: Address,
        goal_index: u64,
        amount: U256,
    ) -> ScholarResult<FundingOutcome> {
        let balance = self.gateway.balance_of(self.sender).await?;
        if balance < amount {
            return Err(ScholarError::InsufficientBalance {
                have: format_token_amount(balance),
                need: format_token_amount(amount),
            });
        }

        let allowance = self.gateway.allowance(self.sender, campaign).await?;
        let approval_tx = if allowance < amount {
            let tx = self.gateway.approve(campaign, amount).await?;
            info!(
                spender = %campaign,
                amount = %format_token_amount(amount),
                %tx,
                "token approval confirmed"
            );
            Some(tx)
        } else {
            None
        };

        match self.gateway.fund(campaign, goal_index, amount).await {
            Ok(fund_tx) => {
                info!(
                    campaign = %campaign,
                    goal_index,
                    amount = %format_token_amount(amount),
                    tx = %fund_tx,
                    "goal funded"
                );
                Ok(FundingOutcome {
                    campaign,
                    goal_index,
                    amount,
                    approval_tx,
                    fund_tx,
                })
            }
            Err(err) => match approval_tx {
                // The approval went through, so the allowance is now dangling
                Some(approval_tx) => {
                    warn!(
                        campaign = %campaign,
                        %approval_tx,
                        "fund call failed after approval was confirmed"
                    );
                    Err(ScholarError::ApprovalStranded {
                        approval_tx,
                        reason: err.to_string(),
                    })
                }
                None => Err(err),
            },
        }
    }

    /// Token balance of an arbitrary account
    pub async fn token_balance(&self, account: Address) -> ScholarResult<U256> {
        self.gateway.balance_of(account).await
    }

    pub async fn token_decimals(&self) -> ScholarResult<u8> {
        self.gateway.decimals().await
    }

    pub async fn token_symbol(&self) -> ScholarResult<String> {
        self.gateway.symbol().await
    }

    /// Mint mock IDRX to an account. Only works on test deployments where
    /// the token exposes an open faucet.
    pub async fn mint(&self, to: Address, amount: U256) -> ScholarResult<B256> {
        self.gateway.mint(to, amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::to_token_units;
    use std::sync::Mutex;

    struct MockGateway {
        balance: U256,
        allowance: U256,
        fund_ok: bool,
        approvals: Mutex<Vec<(Address, U256)>>,
    }

    impl MockGateway {
        fn new(balance: U256, allowance: U256, fund_ok: bool) -> Self {
            Self {
                balance,
                allowance,
                fund_ok,
                approvals: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FundingGateway for MockGateway {
        async fn balance_of(&self, _account: Address) -> ScholarResult<U256> {
            Ok(self.balance)
        }

        async fn allowance(&self, _owner: Address, _spender: Address) -> ScholarResult<U256> {
            Ok(self.allowance)
        }

        async fn approve(&self, spender: Address, amount: U256) -> ScholarResult<B256> {
            self.approvals.lock().unwrap().push((spender, amount));
            Ok(B256::repeat_byte(0xa1))
        }

        async fn fund(
            &self,
            _campaign: Address,
            _goal_index: u64,
            _amount: U256,
        ) -> ScholarResult<B256> {
            if self.fund_ok {
                Ok(B256::repeat_byte(0xf1))
            } else {
                Err(ScholarError::Reverted(B256::repeat_byte(0xf1)))
            }
        }

        async fn decimals(&self) -> ScholarResult<u8> {
            Ok(18)
        }

        async fn symbol(&self) -> ScholarResult<String> {
            Ok("IDRX".to_string())
        }

        async fn mint(&self, _to: Address, _amount: U256) -> ScholarResult<B256> {
            Ok(B256::repeat_byte(0x33))
        }
    }

    fn manager(gateway: Arc<MockGateway>) -> FundingManager {
        FundingManager::new(gateway, Address::repeat_byte(0x20), Address::repeat_byte(0x0a))
    }

    #[tokio::test]
    async fn sufficient_allowance_funds_without_approval() {
        let gateway = Arc::new(MockGateway::new(to_token_units(100), to_token_units(100), true));
        let manager = manager(gateway.clone());

        let outcome = manager
            .fund(Address::repeat_byte(1), 0, to_token_units(50))
            .await
            .unwrap();
        assert_eq!(outcome.approval_tx, None);
        assert_eq!(outcome.fund_tx, B256::repeat_byte(0xf1));
        assert!(gateway.approvals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_allowance_approves_before_funding() {
        let gateway = Arc::new(MockGateway::new(to_token_units(100), U256::ZERO, true));
        let manager = manager(gateway.clone());
        let campaign = Address::repeat_byte(1);
        let amount = to_token_units(50);

        let outcome = manager.fund(campaign, 1, amount).await.unwrap();
        assert_eq!(outcome.approval_tx, Some(B256::repeat_byte(0xa1)));
        assert_eq!(
            gateway.approvals.lock().unwrap().as_slice(),
            &[(campaign, amount)]
        );
    }

    #[tokio::test]
    async fn fund_failure_after_approval_is_reported_as_stranded() {
        let gateway = Arc::new(MockGateway::new(to_token_units(100), U256::ZERO, false));
        let manager = manager(gateway.clone());

        let err = manager
            .fund(Address::repeat_byte(1), 0, to_token_units(50))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScholarError::ApprovalStranded { approval_tx, .. }
                if approval_tx == B256::repeat_byte(0xa1)
        ));
        assert!(err.is_retryable());
        // The approval really was submitted before the fund call died
        assert_eq!(gateway.approvals.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fund_failure_without_approval_is_a_clean_error() {
        let gateway = Arc::new(MockGateway::new(
            to_token_units(100),
            to_token_units(100),
            false,
        ));
        let manager = manager(gateway);

        let err = manager
            .fund(Address::repeat_byte(1), 0, to_token_units(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ScholarError::Reverted(_)));
    }

    #[tokio::test]
    async fn insufficient_balance_is_checked_before_any_transaction() {
        let gateway = Arc::new(MockGateway::new(to_token_units(10), U256::ZERO, true));
        let manager = manager(gateway.clone());

        let err = manager
            .fund(Address::repeat_byte(1), 0, to_token_units(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ScholarError::InsufficientBalance { .. }));
        assert!(gateway.approvals.lock().unwrap().is_empty());
    }
}
