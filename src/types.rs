// src/types.rs
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ScholarError, ScholarResult};

/// Token amounts are fixed-point with 18 decimals, like wei.
pub const WEI_PER_TOKEN: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// GPA criteria are fixed-point integers scaled by 100 (3.25 -> 325).
pub const GPA_SCALE: u64 = 100;

/// Lifecycle of a single goal, as enforced by the campaign contract.
/// Happy path is Idle -> Running -> Granted; Running -> Refunded on failure.
/// The client mirrors these states, it does not enforce the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    Idle,
    Running,
    Granted,
    Refunded,
}

impl GoalStatus {
    /// Granted and Refunded goals never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, GoalStatus::Granted | GoalStatus::Refunded)
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            GoalStatus::Idle => 0,
            GoalStatus::Running => 1,
            GoalStatus::Granted => 2,
            GoalStatus::Refunded => 3,
        }
    }
}

impl TryFrom<u8> for GoalStatus {
    type Error = ScholarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GoalStatus::Idle),
            1 => Ok(GoalStatus::Running),
            2 => Ok(GoalStatus::Granted),
            3 => Ok(GoalStatus::Refunded),
            other => Err(ScholarError::InvalidStatus(other)),
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GoalStatus::Idle => "idle",
            GoalStatus::Running => "running",
            GoalStatus::Granted => "granted",
            GoalStatus::Refunded => "refunded",
        };
        write!(f, "{label}")
    }
}

/// Academic criterion gating a goal's disbursement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    /// Minimum GPA scaled by [`GPA_SCALE`], raw as stored on-chain
    pub min_gpa_raw: u64,
    pub pass_or_fail: bool,
}

impl Criteria {
    pub fn min_gpa(&self) -> f64 {
        self.min_gpa_raw as f64 / GPA_SCALE as f64
    }
}

/// One funding tranche of a campaign, shown as a "milestone" in the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target: U256,
    /// Current raised balance, from the parallel `goalBalances` array
    pub raised: U256,
    pub criteria: Criteria,
    pub status: GoalStatus,
    pub send_to_recipient: U256,
    pub send_to_institution: U256,
    pub backers: Vec<Address>,
    /// None while the goal has no genuine (nonzero) attestation UID
    pub attestation_uid: Option<B256>,
}

impl Goal {
    pub fn remaining(&self) -> U256 {
        self.target.saturating_sub(self.raised)
    }

    pub fn is_fully_funded(&self) -> bool {
        self.raised >= self.target
    }
}

/// One student's scholarship campaign, re-derived from `getCampaignDetails`
/// on every fetch. Snapshots are disposable; nothing here is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub address: Address,
    pub name: String,
    pub id: u64,
    pub institution: Address,
    pub recipient: Address,
    pub goals: Vec<Goal>,
    /// None while the admission UID slot is all-zero
    pub admission_attestation: Option<B256>,
    pub is_admitted: bool,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl Campaign {
    pub fn total_target(&self) -> U256 {
        self.goals
            .iter()
            .fold(U256::ZERO, |acc, g| acc.saturating_add(g.target))
    }

    pub fn total_raised(&self) -> U256 {
        self.goals
            .iter()
            .fold(U256::ZERO, |acc, g| acc.saturating_add(g.raised))
    }

    /// Index of the first goal that has not been granted yet.
    /// Returns None once every goal reached a terminal state.
    pub fn current_goal_index(&self) -> Option<usize> {
        self.goals.iter().position(|g| !g.status.is_terminal())
    }

    /// Overall funding progress in [0, 1]
    pub fn progress(&self) -> f64 {
        let target = self.total_target();
        if target.is_zero() {
            return 0.0;
        }
        // Basis points keep the division inside integer math; clamp in case
        // a snapshot ever reports raised past the target
        let basis = self.total_raised().saturating_mul(U256::from(10_000u64)) / target;
        basis.min(U256::from(10_000u64)).to::<u64>() as f64 / 10_000.0
    }

    pub fn to_json(&self) -> ScholarResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Goal parameters for campaign creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSpec {
    pub name: String,
    pub target: U256,
    pub min_gpa: f64,
    pub pass_or_fail: bool,
}

/// Campaign parameters for `createCampaign`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub name: String,
    pub institution: Address,
    pub recipient: Address,
    pub goals: Vec<GoalSpec>,
}

/// Result of a successful `createCampaign` transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedCampaign {
    pub campaign: Address,
    pub creator: Address,
    pub tx_hash: B256,
}

/// Result of a completed allowance/approve/fund sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingOutcome {
    pub campaign: Address,
    pub goal_index: u64,
    pub amount: U256,
    /// Present when an approval transaction had to be submitted first
    pub approval_tx: Option<B256>,
    pub fund_tx: B256,
}

/// Result of a completed attest-then-link sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationOutcome {
    pub workflow_id: Uuid,
    pub uid: B256,
    pub attest_tx: B256,
    pub link_tx: B256,
}

/// Result of a completed revoke-then-unlink sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeOutcome {
    pub uid: B256,
    pub registry_tx: B256,
    pub campaign_tx: B256,
}

/// Encode a short UTF-8 string as a right-zero-padded bytes32, the form the
/// contracts use for campaign, goal and schema-type names
pub fn string_to_bytes32(value: &str) -> ScholarResult<B256> {
    let bytes = value.as_bytes();
    if bytes.len() > 32 {
        return Err(ScholarError::Encode(format!(
            "'{value}' does not fit in bytes32 ({} bytes)",
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(out))
}

/// Decode a right-zero-padded bytes32 back to a UTF-8 string
pub fn bytes32_to_string(value: &B256) -> ScholarResult<String> {
    let end = value
        .as_slice()
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |i| i + 1);
    String::from_utf8(value.as_slice()[..end].to_vec())
        .map_err(|_| ScholarError::Decode(format!("bytes32 {value} is not valid UTF-8")))
}

/// Scale a whole-token amount to the on-chain 18-decimal representation
pub fn to_token_units(whole: u64) -> U256 {
    U256::from(whole) * WEI_PER_TOKEN
}

/// Encode a GPA for on-chain storage (3.25 -> 325)
pub fn encode_gpa(gpa: f64) -> u64 {
    (gpa * GPA_SCALE as f64).round() as u64
}

/// Format an 18-decimal token amount as whole units with 4 fractional digits
pub fn format_token_amount(amount: U256) -> String {
    let whole = amount / WEI_PER_TOKEN;
    // First four fractional digits, truncated like the frontend did
    let frac = (amount % WEI_PER_TOKEN) / U256::from(100_000_000_000_000u64);
    format!("{whole}.{:04}", frac.to::<u64>())
}

/// `0x1234...abcd` display form of an address
pub fn truncate_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Short display form of an attestation UID
pub fn format_uid(uid: &B256) -> String {
    let full = hex::encode(uid);
    format!("0x{}...{}", &full[..6], &full[full.len() - 6..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: u64, raised: u64, status: GoalStatus) -> Goal {
        Goal {
            name: "Semester".to_string(),
            target: to_token_units(target),
            raised: to_token_units(raised),
            criteria: Criteria {
                min_gpa_raw: 300,
                pass_or_fail: false,
            },
            status,
            send_to_recipient: U256::ZERO,
            send_to_institution: U256::ZERO,
            backers: vec![],
            attestation_uid: None,
        }
    }

    fn campaign(goals: Vec<Goal>) -> Campaign {
        Campaign {
            address: Address::ZERO,
            name: "CS Degree Fund".to_string(),
            id: 1,
            institution: Address::repeat_byte(1),
            recipient: Address::repeat_byte(2),
            goals,
            admission_attestation: None,
            is_admitted: false,
            fetched_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn status_roundtrip_and_bounds() {
        for byte in 0..4u8 {
            let status = GoalStatus::try_from(byte).unwrap();
            assert_eq!(status.as_u8(), byte);
        }
        assert!(matches!(
            GoalStatus::try_from(4),
            Err(ScholarError::InvalidStatus(4))
        ));
    }

    #[test]
    fn current_goal_is_first_non_terminal() {
        let c = campaign(vec![
            goal(20, 20, GoalStatus::Granted),
            goal(20, 10, GoalStatus::Running),
            goal(25, 0, GoalStatus::Idle),
        ]);
        assert_eq!(c.current_goal_index(), Some(1));

        let done = campaign(vec![
            goal(20, 20, GoalStatus::Granted),
            goal(20, 0, GoalStatus::Refunded),
        ]);
        assert_eq!(done.current_goal_index(), None);
    }

    #[test]
    fn progress_aggregates_across_goals() {
        let c = campaign(vec![
            goal(20, 20, GoalStatus::Granted),
            goal(20, 10, GoalStatus::Running),
        ]);
        assert_eq!(c.total_target(), to_token_units(40));
        assert_eq!(c.total_raised(), to_token_units(30));
        assert!((c.progress() - 0.75).abs() < 1e-9);

        let empty = campaign(vec![]);
        assert_eq!(empty.progress(), 0.0);
    }

    #[test]
    fn bytes32_strings_roundtrip() {
        let encoded = string_to_bytes32("admission").unwrap();
        assert_eq!(&encoded.as_slice()[..9], b"admission");
        assert!(encoded.as_slice()[9..].iter().all(|b| *b == 0));
        assert_eq!(bytes32_to_string(&encoded).unwrap(), "admission");

        assert_eq!(bytes32_to_string(&B256::ZERO).unwrap(), "");
        assert!(bytes32_to_string(&B256::repeat_byte(0xff)).is_err());

        // An oversized name is caller input, not corrupt chain data
        let err = string_to_bytes32(&"x".repeat(33)).unwrap_err();
        assert!(matches!(err, ScholarError::Encode(_)));
        assert_eq!(err.category(), "encode");
    }

    #[test]
    fn gpa_encoding() {
        assert_eq!(encode_gpa(3.25), 325);
        assert_eq!(encode_gpa(3.0), 300);
        let criteria = Criteria {
            min_gpa_raw: 325,
            pass_or_fail: false,
        };
        assert!((criteria.min_gpa() - 3.25).abs() < 1e-9);
    }

    #[test]
    fn token_amount_display() {
        assert_eq!(format_token_amount(to_token_units(1_500)), "1500.0000");
        let with_frac = to_token_units(2) + U256::from(450_000_000_000_000_000u64);
        assert_eq!(format_token_amount(with_frac), "2.4500");
    }

    #[test]
    fn address_and_uid_display() {
        let addr: Address = "0x700b6a60ce7eaaea56f065753d8dcb9653dbad35"
            .parse()
            .unwrap();
        let short = truncate_address(&addr);
        assert!(short.starts_with("0x70"));
        assert!(short.to_lowercase().ends_with("ad35"));
        assert!(short.contains("..."));
        assert_eq!(short.len(), 6 + 3 + 4);

        let uid = B256::repeat_byte(0xab);
        assert_eq!(format_uid(&uid), "0xababab...ababab");
    }

    #[test]
    fn campaign_snapshot_serializes() {
        let c = campaign(vec![goal(20, 5, GoalStatus::Running)]);
        let json = c.to_json().unwrap();
        let back: Campaign = serde_json::from_str(&json).unwrap();
        assert_eq!(back.goals.len(), 1);
        assert_eq!(back.goals[0].status, GoalStatus::Running);
    }
}
