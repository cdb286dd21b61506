// src/attestation/workflow.rs
//! In-memory ledger of two-phase attestation workflows. Issuing or revoking
//! an attestation takes two non-atomic transactions (a registry call, then a
//! link or unlink call on the campaign contract); the ledger keeps the
//! intermediate state so a workflow that died between the phases is visible
//! and can be re-driven instead of silently diverging from the campaign.

use std::collections::HashMap;

use alloy::primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ScholarError, ScholarResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowKind {
    Admission,
    Goal {
        goal_index: u64,
        gpa_raw: u64,
        pass_or_fail: bool,
    },
    /// Revocation of an existing admission attestation
    Revocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowPhase {
    /// Nothing submitted yet
    Pending,
    /// Registry transaction confirmed, campaign transaction not yet confirmed
    RegistryConfirmed { uid: B256 },
    /// Both phases confirmed
    Linked { uid: B256, link_tx: B256 },
    /// Terminal failure; `uid` is set when phase one had already succeeded
    Failed { reason: String, uid: Option<B256> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationWorkflow {
    pub id: Uuid,
    pub campaign: Address,
    pub recipient: Address,
    pub kind: WorkflowKind,
    /// Schema-encoded payload, kept so the link step can be resubmitted.
    /// Empty for revocations.
    pub encoded_data: Bytes,
    pub registry_tx: Option<B256>,
    pub phase: WorkflowPhase,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AttestationWorkflow {
    /// The registry state changed but the campaign contract was never
    /// updated to match
    pub fn is_stranded(&self) -> bool {
        matches!(
            self.phase,
            WorkflowPhase::RegistryConfirmed { .. } | WorkflowPhase::Failed { uid: Some(_), .. }
        )
    }

    pub fn uid(&self) -> Option<B256> {
        match &self.phase {
            WorkflowPhase::Pending => None,
            WorkflowPhase::RegistryConfirmed { uid } | WorkflowPhase::Linked { uid, .. } => {
                Some(*uid)
            }
            WorkflowPhase::Failed { uid, .. } => *uid,
        }
    }
}

#[derive(Debug, Default)]
pub struct WorkflowLedger {
    workflows: HashMap<Uuid, AttestationWorkflow>,
}

impl WorkflowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(
        &mut self,
        campaign: Address,
        recipient: Address,
        kind: WorkflowKind,
        encoded_data: Bytes,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        self.workflows.insert(
            id,
            AttestationWorkflow {
                id,
                campaign,
                recipient,
                kind,
                encoded_data,
                registry_tx: None,
                phase: WorkflowPhase::Pending,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&AttestationWorkflow> {
        self.workflows.get(&id)
    }

    pub fn mark_registry_confirmed(
        &mut self,
        id: Uuid,
        uid: B256,
        registry_tx: B256,
    ) -> ScholarResult<()> {
        let workflow = self.get_mut(id)?;
        workflow.registry_tx = Some(registry_tx);
        workflow.phase = WorkflowPhase::RegistryConfirmed { uid };
        workflow.updated_at = chrono::Utc::now();
        Ok(())
    }

    pub fn mark_linked(&mut self, id: Uuid, link_tx: B256) -> ScholarResult<()> {
        let workflow = self.get_mut(id)?;
        let uid = workflow.uid().ok_or(ScholarError::WorkflowNotLinkable(id))?;
        workflow.phase = WorkflowPhase::Linked { uid, link_tx };
        workflow.updated_at = chrono::Utc::now();
        Ok(())
    }

    pub fn mark_failed(&mut self, id: Uuid, reason: String) -> ScholarResult<()> {
        let workflow = self.get_mut(id)?;
        let uid = workflow.uid();
        workflow.phase = WorkflowPhase::Failed { reason, uid };
        workflow.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Workflows whose registry phase confirmed but whose campaign phase
    /// never did
    pub fn stranded(&self) -> Vec<&AttestationWorkflow> {
        self.workflows.values().filter(|w| w.is_stranded()).collect()
    }

    pub fn all(&self) -> Vec<&AttestationWorkflow> {
        self.workflows.values().collect()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    fn get_mut(&mut self, id: Uuid) -> ScholarResult<&mut AttestationWorkflow> {
        self.workflows
            .get_mut(&id)
            .ok_or(ScholarError::WorkflowNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_workflow() -> (WorkflowLedger, Uuid) {
        let mut ledger = WorkflowLedger::new();
        let id = ledger.begin(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            WorkflowKind::Admission,
            Bytes::from(vec![0u8; 32]),
        );
        (ledger, id)
    }

    #[test]
    fn happy_path_reaches_linked() {
        let (mut ledger, id) = ledger_with_workflow();
        let uid = B256::repeat_byte(0xaa);

        ledger
            .mark_registry_confirmed(id, uid, B256::repeat_byte(1))
            .unwrap();
        assert!(ledger.get(id).unwrap().is_stranded());

        ledger.mark_linked(id, B256::repeat_byte(2)).unwrap();
        let workflow = ledger.get(id).unwrap();
        assert!(!workflow.is_stranded());
        assert_eq!(workflow.uid(), Some(uid));
        assert!(ledger.stranded().is_empty());
    }

    #[test]
    fn failure_after_attest_keeps_uid_and_strands() {
        let (mut ledger, id) = ledger_with_workflow();
        let uid = B256::repeat_byte(0xaa);

        ledger
            .mark_registry_confirmed(id, uid, B256::repeat_byte(1))
            .unwrap();
        ledger.mark_failed(id, "link reverted".to_string()).unwrap();

        let workflow = ledger.get(id).unwrap();
        assert!(workflow.is_stranded());
        assert_eq!(workflow.uid(), Some(uid));
        assert_eq!(ledger.stranded().len(), 1);

        // A stranded workflow can still be driven to Linked
        ledger.mark_linked(id, B256::repeat_byte(2)).unwrap();
        assert!(ledger.stranded().is_empty());
    }

    #[test]
    fn failure_before_attest_is_not_stranded() {
        let (mut ledger, id) = ledger_with_workflow();
        ledger.mark_failed(id, "registry refused".to_string()).unwrap();

        let workflow = ledger.get(id).unwrap();
        assert!(!workflow.is_stranded());
        assert_eq!(workflow.uid(), None);
    }

    #[test]
    fn revocation_workflow_strands_like_issuance() {
        let mut ledger = WorkflowLedger::new();
        let id = ledger.begin(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            WorkflowKind::Revocation,
            Bytes::new(),
        );
        let uid = B256::repeat_byte(0xbb);

        ledger
            .mark_registry_confirmed(id, uid, B256::repeat_byte(3))
            .unwrap();
        ledger.mark_failed(id, "unlink reverted".to_string()).unwrap();

        let workflow = ledger.get(id).unwrap();
        assert!(workflow.is_stranded());
        assert_eq!(workflow.kind, WorkflowKind::Revocation);
        assert_eq!(workflow.uid(), Some(uid));
    }

    #[test]
    fn pending_workflow_cannot_be_linked() {
        let (mut ledger, id) = ledger_with_workflow();
        assert!(matches!(
            ledger.mark_linked(id, B256::ZERO),
            Err(ScholarError::WorkflowNotLinkable(_))
        ));
    }

    #[test]
    fn unknown_workflow_is_reported() {
        let mut ledger = WorkflowLedger::new();
        assert!(matches!(
            ledger.mark_failed(Uuid::new_v4(), "x".to_string()),
            Err(ScholarError::WorkflowNotFound(_))
        ));
    }
}
