// src/attestation/mod.rs
pub mod schema;
pub mod workflow;

pub use schema::{encode_admission_data, encode_goal_data};
pub use workflow::{AttestationWorkflow, WorkflowKind, WorkflowLedger, WorkflowPhase};

use std::sync::Arc;

use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::DynProvider;
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::abi;
use crate::campaign::uid_if_valid;
use crate::error::{ScholarError, ScholarResult};
use crate::types::{AttestationOutcome, RevokeOutcome, encode_gpa};

/// Parameters for one registry attestation
#[derive(Debug, Clone)]
pub struct AttestParams {
    pub schema: B256,
    pub recipient: Address,
    pub revocable: bool,
    pub data: Bytes,
}

/// What the registry reports back once the attest transaction confirmed
#[derive(Debug, Clone)]
pub struct RegistryAttestation {
    pub uid: B256,
    pub tx_hash: B256,
}

/// Seam over the attestation registry so workflows can be exercised against
/// a mock in tests.
#[async_trait]
pub trait EasRegistry: Send + Sync {
    async fn attest(&self, params: AttestParams) -> ScholarResult<RegistryAttestation>;

    /// Revoke an attestation, returning the transaction hash
    async fn revoke(&self, schema: B256, uid: B256) -> ScholarResult<B256>;
}

/// The real EAS contract
pub struct OnchainEas {
    provider: DynProvider,
    address: Address,
}

impl OnchainEas {
    pub fn new(provider: DynProvider, address: Address) -> Self {
        Self { provider, address }
    }

    fn instance(&self) -> abi::IEAS::IEASInstance<DynProvider> {
        abi::IEAS::new(self.address, self.provider.clone())
    }
}

#[async_trait]
impl EasRegistry for OnchainEas {
    async fn attest(&self, params: AttestParams) -> ScholarResult<RegistryAttestation> {
        let request = abi::IEAS::AttestationRequest {
            schema: params.schema,
            data: abi::IEAS::AttestationRequestData {
                recipient: params.recipient,
                expirationTime: 0,
                revocable: params.revocable,
                refUID: B256::ZERO,
                data: params.data,
                value: U256::ZERO,
            },
        };

        let receipt = self
            .instance()
            .attest(request)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            return Err(ScholarError::Reverted(receipt.transaction_hash));
        }

        let uid = uid_from_receipt(&receipt).ok_or_else(|| {
            ScholarError::Attestation("attest receipt carries no Attested event".to_string())
        })?;

        Ok(RegistryAttestation {
            uid,
            tx_hash: receipt.transaction_hash,
        })
    }

    async fn revoke(&self, schema: B256, uid: B256) -> ScholarResult<B256> {
        let request = abi::IEAS::RevocationRequest {
            schema,
            data: abi::IEAS::RevocationRequestData {
                uid,
                value: U256::ZERO,
            },
        };

        let receipt = self
            .instance()
            .revoke(request)
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

/// The new attestation UID travels in the `Attested` event
fn uid_from_receipt(receipt: &TransactionReceipt) -> Option<B256> {
    receipt
        .logs()
        .iter()
        .find_map(|log| log.log_decode::<abi::IEAS::Attested>().ok())
        .map(|log| log.inner.data.uid)
}

/// Drives the two-phase attestation workflows: issue or revoke an
/// attestation in the registry, then reflect it on the campaign contract.
/// The phases are not atomic; every workflow is tracked in a
/// [`WorkflowLedger`] so a partial failure leaves a queryable record instead
/// of a registry silently out of step with the campaign.
#[derive(Clone)]
pub struct AttestationManager {
    registry: Arc<dyn EasRegistry>,
    provider: DynProvider,
    schema_uid: B256,
    ledger: Arc<RwLock<WorkflowLedger>>,
}

impl AttestationManager {
    pub fn new(registry: Arc<dyn EasRegistry>, provider: DynProvider, schema_uid: B256) -> Self {
        Self {
            registry,
            provider,
            schema_uid,
            ledger: Arc::new(RwLock::new(WorkflowLedger::new())),
        }
    }

    fn campaign_instance(&self, address: Address) -> abi::Campaign::CampaignInstance<DynProvider> {
        abi::Campaign::new(address, self.provider.clone())
    }

    /// Attest that the student was admitted, then record the UID on the
    /// campaign via `attestAdmission`.
    pub async fn attest_admission(
        &self,
        campaign: Address,
        recipient: Address,
    ) -> ScholarResult<AttestationOutcome> {
        let data = encode_admission_data();
        let workflow_id = self
            .ledger
            .write()
            .await
            .begin(campaign, recipient, WorkflowKind::Admission, data.clone());

        // Admission attestations stay revocable so the institution can
        // reverse a mistaken admission
        let attested = self
            .attest_phase(workflow_id, recipient, true, data.clone())
            .await?;

        let instance = self.campaign_instance(campaign);
        let link = instance.attestAdmission(attested.uid, data);
        let link_tx = self.link_phase(workflow_id, campaign, attested.uid, link.send()).await?;

        Ok(AttestationOutcome {
            workflow_id,
            uid: attested.uid,
            attest_tx: attested.tx_hash,
            link_tx,
        })
    }

    /// Attest a goal result (GPA, pass/fail), then record the UID on the
    /// campaign via `setGoalAttestation`.
    pub async fn attest_goal(
        &self,
        campaign: Address,
        goal_index: u64,
        recipient: Address,
        gpa: f64,
        pass_or_fail: bool,
    ) -> ScholarResult<AttestationOutcome> {
        let gpa_raw = encode_gpa(gpa);
        let data = encode_goal_data(gpa_raw);
        let kind = WorkflowKind::Goal {
            goal_index,
            gpa_raw,
            pass_or_fail,
        };
        let workflow_id = self
            .ledger
            .write()
            .await
            .begin(campaign, recipient, kind, data.clone());

        // Goal attestations are permanent records, not revocable
        let attested = self
            .attest_phase(workflow_id, recipient, false, data.clone())
            .await?;

        let instance = self.campaign_instance(campaign);
        let link = instance.setGoalAttestation(
            attested.uid,
            U256::from(goal_index),
            data,
            U256::from(gpa_raw),
            pass_or_fail,
        );
        let link_tx = self.link_phase(workflow_id, campaign, attested.uid, link.send()).await?;

        Ok(AttestationOutcome {
            workflow_id,
            uid: attested.uid,
            attest_tx: attested.tx_hash,
            link_tx,
        })
    }

    /// Revoke the campaign's admission attestation in the registry, then
    /// clear it on the campaign via `revokeAdmission`. Same two-phase,
    /// non-atomic shape as issuance, tracked in the same ledger.
    pub async fn revoke_admission(&self, campaign: Address) -> ScholarResult<RevokeOutcome> {
        let instance = self.campaign_instance(campaign);
        let uid = instance.admissionAttestation().call().await?;
        let uid = uid_if_valid(uid).ok_or_else(|| {
            ScholarError::InvalidAttestationUid(format!(
                "campaign {campaign} has no admission attestation"
            ))
        })?;
        let recipient = instance.recipientAddress().call().await?;

        self.revoke_admission_uid(campaign, recipient, uid).await
    }

    /// Revoke a known admission attestation UID. Callers already holding a
    /// fresh campaign snapshot skip the reads `revoke_admission` does.
    pub async fn revoke_admission_uid(
        &self,
        campaign: Address,
        recipient: Address,
        uid: B256,
    ) -> ScholarResult<RevokeOutcome> {
        let workflow_id = self.ledger.write().await.begin(
            campaign,
            recipient,
            WorkflowKind::Revocation,
            Bytes::new(),
        );

        let registry_tx = match self.registry.revoke(self.schema_uid, uid).await {
            Ok(tx) => {
                info!(%uid, %tx, "registry revocation confirmed");
                self.ledger
                    .write()
                    .await
                    .mark_registry_confirmed(workflow_id, uid, tx)?;
                tx
            }
            Err(err) => {
                self.ledger
                    .write()
                    .await
                    .mark_failed(workflow_id, err.to_string())?;
                return Err(err);
            }
        };

        let instance = self.campaign_instance(campaign);
        let unlink = instance.revokeAdmission(uid);
        let campaign_tx = self
            .link_phase(workflow_id, campaign, uid, unlink.send())
            .await?;

        info!(campaign = %campaign, %uid, "admission attestation revoked");
        Ok(RevokeOutcome {
            uid,
            registry_tx,
            campaign_tx,
        })
    }

    /// Re-drive the campaign step of a workflow whose registry transaction
    /// confirmed but whose campaign transaction did not.
    pub async fn link_pending(&self, workflow_id: Uuid) -> ScholarResult<AttestationOutcome> {
        let (campaign, uid, attest_tx, kind, data) = {
            let ledger = self.ledger.read().await;
            let workflow = ledger
                .get(workflow_id)
                .ok_or(ScholarError::WorkflowNotFound(workflow_id))?;
            if matches!(workflow.phase, WorkflowPhase::Linked { .. }) {
                return Err(ScholarError::WorkflowNotLinkable(workflow_id));
            }
            let uid = workflow
                .uid()
                .ok_or(ScholarError::WorkflowNotLinkable(workflow_id))?;
            (
                workflow.campaign,
                uid,
                workflow.registry_tx.unwrap_or_default(),
                workflow.kind.clone(),
                workflow.encoded_data.clone(),
            )
        };

        let instance = self.campaign_instance(campaign);
        let link_tx = match kind {
            WorkflowKind::Admission => {
                let call = instance.attestAdmission(uid, data);
                self.link_phase(workflow_id, campaign, uid, call.send()).await?
            }
            WorkflowKind::Goal {
                goal_index,
                gpa_raw,
                pass_or_fail,
            } => {
                let call = instance.setGoalAttestation(
                    uid,
                    U256::from(goal_index),
                    data,
                    U256::from(gpa_raw),
                    pass_or_fail,
                );
                self.link_phase(workflow_id, campaign, uid, call.send()).await?
            }
            WorkflowKind::Revocation => {
                let call = instance.revokeAdmission(uid);
                self.link_phase(workflow_id, campaign, uid, call.send()).await?
            }
        };

        Ok(AttestationOutcome {
            workflow_id,
            uid,
            attest_tx,
            link_tx,
        })
    }

    /// All workflows started on this manager
    pub async fn workflows(&self) -> Vec<AttestationWorkflow> {
        self.ledger.read().await.all().into_iter().cloned().collect()
    }

    /// Workflows whose registry phase confirmed but whose campaign phase
    /// never did
    pub async fn stranded_workflows(&self) -> Vec<AttestationWorkflow> {
        self.ledger
            .read()
            .await
            .stranded()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn workflow(&self, workflow_id: Uuid) -> Option<AttestationWorkflow> {
        self.ledger.read().await.get(workflow_id).cloned()
    }

    async fn attest_phase(
        &self,
        workflow_id: Uuid,
        recipient: Address,
        revocable: bool,
        data: Bytes,
    ) -> ScholarResult<RegistryAttestation> {
        let params = AttestParams {
            schema: self.schema_uid,
            recipient,
            revocable,
            data,
        };

        match self.registry.attest(params).await {
            Ok(attested) => {
                info!(uid = %attested.uid, tx = %attested.tx_hash, "registry attestation confirmed");
                self.ledger
                    .write()
                    .await
                    .mark_registry_confirmed(workflow_id, attested.uid, attested.tx_hash)?;
                Ok(attested)
            }
            Err(err) => {
                self.ledger
                    .write()
                    .await
                    .mark_failed(workflow_id, err.to_string())?;
                Err(err)
            }
        }
    }

    async fn link_phase<F>(
        &self,
        workflow_id: Uuid,
        campaign: Address,
        uid: B256,
        send: F,
    ) -> ScholarResult<B256>
    where
        F: Future<
            Output = Result<
                alloy::providers::PendingTransactionBuilder<alloy::network::Ethereum>,
                alloy::contract::Error,
            >,
        >,
    {
        let result = async {
            let receipt = send.await?.get_receipt().await?;
            if !receipt.status() {
                return Err(ScholarError::Reverted(receipt.transaction_hash));
            }
            Ok(receipt.transaction_hash)
        }
        .await;

        match result {
            Ok(link_tx) => {
                info!(campaign = %campaign, %uid, tx = %link_tx, "campaign updated with attestation state");
                self.ledger.write().await.mark_linked(workflow_id, link_tx)?;
                Ok(link_tx)
            }
            Err(err) => {
                warn!(campaign = %campaign, %uid, error = %err, "registry confirmed but campaign update failed");
                self.ledger
                    .write()
                    .await
                    .mark_failed(workflow_id, err.to_string())?;
                Err(ScholarError::AttestationNotLinked {
                    uid,
                    campaign,
                    reason: err.to_string(),
                })
            }
        }
    }
}
