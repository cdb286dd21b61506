// src/error.rs
use alloy::primitives::{Address, B256};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ScholarError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigurationKey(String),

    // Codec errors
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Invalid goal status byte: {0}")]
    InvalidStatus(u8),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid attestation UID: {0}")]
    InvalidAttestationUid(String),

    // Chain interaction errors
    #[error("Contract error: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("Transaction confirmation failed: {0}")]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    #[error("Transaction reverted: {0}")]
    Reverted(B256),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Unexpected chain id: expected {expected}, connected node reports {actual}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("No contract code at {0}")]
    NoContractCode(Address),

    // Funding errors
    #[error("Funding failed: {0}")]
    Funding(String),

    #[error("Insufficient token balance: have {have}, need {need}")]
    InsufficientBalance { have: String, need: String },

    #[error("Goal index {index} out of range for campaign {campaign}")]
    GoalIndexOutOfRange { campaign: Address, index: u64 },

    #[error("Approval {approval_tx} confirmed but fund call failed: {reason}")]
    ApprovalStranded { approval_tx: B256, reason: String },

    // Attestation errors
    #[error("Attestation failed: {0}")]
    Attestation(String),

    #[error("Attestation {uid} issued but not linked to campaign {campaign}: {reason}")]
    AttestationNotLinked {
        uid: B256,
        campaign: Address,
        reason: String,
    },

    #[error("Attestation workflow not found: {0}")]
    WorkflowNotFound(Uuid),

    #[error("Attestation workflow {0} is not awaiting a link step")]
    WorkflowNotLinkable(Uuid),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScholarError {
    /// Check if the failed action is worth re-triggering as-is
    pub fn is_retryable(&self) -> bool {
        match self {
            ScholarError::Rpc(_)
            | ScholarError::PendingTransaction(_)
            | ScholarError::AttestationNotLinked { .. }
            | ScholarError::ApprovalStranded { .. } => true,
            ScholarError::Contract(err) => matches!(err, alloy::contract::Error::TransportError(_)),
            _ => false,
        }
    }

    /// Check if error is critical (misconfiguration, stop all operations)
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            ScholarError::InvalidConfiguration(_)
                | ScholarError::MissingConfigurationKey(_)
                | ScholarError::WrongChain { .. }
                | ScholarError::NoContractCode(_)
        )
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            ScholarError::InvalidConfiguration(_) | ScholarError::MissingConfigurationKey(_) => {
                "configuration"
            }

            ScholarError::Decode(_)
            | ScholarError::InvalidStatus(_)
            | ScholarError::InvalidAddress(_)
            | ScholarError::InvalidAttestationUid(_) => "decode",

            ScholarError::Encode(_) => "encode",

            ScholarError::Contract(_)
            | ScholarError::PendingTransaction(_)
            | ScholarError::Reverted(_)
            | ScholarError::Rpc(_)
            | ScholarError::WrongChain { .. }
            | ScholarError::NoContractCode(_) => "chain",

            ScholarError::Funding(_)
            | ScholarError::InsufficientBalance { .. }
            | ScholarError::GoalIndexOutOfRange { .. }
            | ScholarError::ApprovalStranded { .. } => "funding",

            ScholarError::Attestation(_)
            | ScholarError::AttestationNotLinked { .. }
            | ScholarError::WorkflowNotFound(_)
            | ScholarError::WorkflowNotLinkable(_) => "attestation",

            ScholarError::Serialization(_) => "serialization",
        }
    }
}

// Result type alias for convenience
pub type ScholarResult<T> = Result<T, ScholarError>;
