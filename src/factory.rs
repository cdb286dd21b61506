// src/factory.rs
use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use tracing::info;

use crate::abi;
use crate::error::{ScholarError, ScholarResult};
use crate::types::{CampaignSpec, CreatedCampaign, encode_gpa, string_to_bytes32};

/// Operations against the campaign factory contract: creating campaigns and
/// listing the campaign addresses recorded for an institution or recipient.
#[derive(Clone)]
pub struct FactoryManager {
    provider: DynProvider,
    address: Address,
}

impl FactoryManager {
    pub fn new(provider: DynProvider, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn instance(&self) -> abi::CampaignFactory::CampaignFactoryInstance<DynProvider> {
        abi::CampaignFactory::new(self.address, self.provider.clone())
    }

    /// Submit `createCampaign` and return the new campaign's address,
    /// taken from the `CampaignCreated` event in the receipt.
    pub async fn create_campaign(&self, spec: &CampaignSpec) -> ScholarResult<CreatedCampaign> {
        let goals = spec
            .goals
            .iter()
            .map(|goal| {
                Ok(abi::CampaignFactory::Goal {
                    name: string_to_bytes32(&goal.name)?,
                    target: goal.target,
                    criteria: abi::CampaignFactory::Criteria {
                        minGPA: U256::from(encode_gpa(goal.min_gpa)),
                        passOrFail: goal.pass_or_fail,
                    },
                    // New goals start Idle with nothing disbursed and no backers
                    status: 0,
                    sendToRecipient: U256::ZERO,
                    sendToInstitution: U256::ZERO,
                    backers: vec![],
                })
            })
            .collect::<ScholarResult<Vec<_>>>()?;

        let name = string_to_bytes32(&spec.name)?;
        let receipt = self
            .instance()
            .createCampaign(name, spec.institution, spec.recipient, goals)
            .send()
            .await?
            .get_receipt()
            .await?;

        if !receipt.status() {
            return Err(ScholarError::Reverted(receipt.transaction_hash));
        }

        let created = receipt
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<abi::CampaignFactory::CampaignCreated>().ok())
            .ok_or_else(|| {
                ScholarError::Decode("createCampaign receipt missing CampaignCreated".to_string())
            })?;
        let event = created.inner.data;

        info!(
            campaign = %event.campaignContract,
            creator = %event.creator,
            tx = %receipt.transaction_hash,
            "campaign created"
        );

        Ok(CreatedCampaign {
            campaign: event.campaignContract,
            creator: event.creator,
            tx_hash: receipt.transaction_hash,
        })
    }

    /// Campaign addresses registered under an institution
    pub async fn campaigns_for_institution(
        &self,
        institution: Address,
    ) -> ScholarResult<Vec<Address>> {
        Ok(self
            .instance()
            .getCampaignAddressFromInstitutionAddress(institution)
            .call()
            .await?)
    }

    /// Campaign addresses registered under a recipient (student)
    pub async fn campaigns_for_recipient(&self, recipient: Address) -> ScholarResult<Vec<Address>> {
        Ok(self
            .instance()
            .getCampaignAddressesFromRecipientAddress(recipient)
            .call()
            .await?)
    }

    /// EAS registry address the factory wires into new campaigns
    pub async fn eas_address(&self) -> ScholarResult<Address> {
        Ok(self.instance().easAddress().call().await?)
    }

    /// ERC-20 token address the factory wires into new campaigns
    pub async fn erc20_address(&self) -> ScholarResult<Address> {
        Ok(self.instance().erc20Address().call().await?)
    }
}
