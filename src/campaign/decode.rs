// src/campaign/decode.rs
//! Decoding of the `getCampaignDetails` ABI tuple into the typed campaign
//! model. The goal array arrives alongside two parallel arrays (balances and
//! attestation UIDs) that have to line up index-for-index.

use alloy::primitives::{Address, B256};

use crate::abi;
use crate::error::{ScholarError, ScholarResult};
use crate::types::{Campaign, Criteria, Goal, GoalStatus, bytes32_to_string};

/// A UID slot is considered genuinely set only when it is nonzero;
/// the contract uses all-zero bytes32 as the empty sentinel.
pub fn uid_if_valid(uid: B256) -> Option<B256> {
    if uid.is_zero() { None } else { Some(uid) }
}

pub fn decode_goal(
    raw: abi::Campaign::Goal,
    raised: alloy::primitives::U256,
    attestation_uid: B256,
) -> ScholarResult<Goal> {
    Ok(Goal {
        name: bytes32_to_string(&raw.name)?,
        target: raw.target,
        raised,
        criteria: Criteria {
            min_gpa_raw: raw.criteria.minGPA.try_into().map_err(|_| {
                ScholarError::Decode(format!("minGPA {} out of range", raw.criteria.minGPA))
            })?,
            pass_or_fail: raw.criteria.passOrFail,
        },
        status: GoalStatus::try_from(raw.status)?,
        send_to_recipient: raw.sendToRecipient,
        send_to_institution: raw.sendToInstitution,
        backers: raw.backers,
        attestation_uid: uid_if_valid(attestation_uid),
    })
}

pub fn decode_campaign(
    address: Address,
    details: abi::Campaign::getCampaignDetailsReturn,
) -> ScholarResult<Campaign> {
    let abi::Campaign::getCampaignDetailsReturn {
        _0: name,
        _1: id,
        _2: institution,
        _3: recipient,
        _4: goals,
        _5: attestation_uids,
        _6: balances,
        _7: admission_attestation,
        _8: is_admitted,
    } = details;

    if goals.len() != balances.len() || goals.len() != attestation_uids.len() {
        return Err(ScholarError::Decode(format!(
            "mismatched goal arrays: {} goals, {} balances, {} attestation UIDs",
            goals.len(),
            balances.len(),
            attestation_uids.len()
        )));
    }

    let goals = goals
        .into_iter()
        .zip(balances)
        .zip(attestation_uids)
        .map(|((goal, raised), uid)| decode_goal(goal, raised, uid))
        .collect::<ScholarResult<Vec<_>>>()?;

    Ok(Campaign {
        address,
        name: bytes32_to_string(&name)?,
        id: id
            .try_into()
            .map_err(|_| ScholarError::Decode(format!("campaign id {id} out of range")))?,
        institution,
        recipient,
        goals,
        admission_attestation: uid_if_valid(admission_attestation),
        is_admitted,
        fetched_at: chrono::Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{string_to_bytes32, to_token_units};
    use alloy::primitives::U256;

    fn raw_goal(name: &str, status: u8) -> abi::Campaign::Goal {
        abi::Campaign::Goal {
            name: string_to_bytes32(name).unwrap(),
            target: to_token_units(20),
            criteria: abi::Campaign::Criteria {
                minGPA: U256::from(300),
                passOrFail: false,
            },
            status,
            sendToRecipient: U256::ZERO,
            sendToInstitution: U256::ZERO,
            backers: vec![Address::repeat_byte(9)],
        }
    }

    fn details(
        goals: Vec<abi::Campaign::Goal>,
        balances: Vec<U256>,
        uids: Vec<B256>,
    ) -> abi::Campaign::getCampaignDetailsReturn {
        abi::Campaign::getCampaignDetailsReturn {
            _0: string_to_bytes32("CS Degree Fund").unwrap(),
            _1: U256::from(7),
            _2: Address::repeat_byte(1),
            _3: Address::repeat_byte(2),
            _4: goals,
            _5: uids,
            _6: balances,
            _7: B256::ZERO,
            _8: false,
        }
    }

    #[test]
    fn decodes_full_campaign() {
        let uid = B256::repeat_byte(0xaa);
        let campaign = decode_campaign(
            Address::repeat_byte(5),
            details(
                vec![raw_goal("Semester 1", 2), raw_goal("Semester 2", 1)],
                vec![to_token_units(20), to_token_units(5)],
                vec![uid, B256::ZERO],
            ),
        )
        .unwrap();

        assert_eq!(campaign.name, "CS Degree Fund");
        assert_eq!(campaign.id, 7);
        assert!(!campaign.is_admitted);
        assert_eq!(campaign.admission_attestation, None);

        assert_eq!(campaign.goals.len(), 2);
        assert_eq!(campaign.goals[0].status, GoalStatus::Granted);
        assert_eq!(campaign.goals[0].attestation_uid, Some(uid));
        assert_eq!(campaign.goals[1].status, GoalStatus::Running);
        assert_eq!(campaign.goals[1].attestation_uid, None);
        assert_eq!(campaign.goals[1].raised, to_token_units(5));
        assert_eq!(campaign.goals[1].remaining(), to_token_units(15));
        assert_eq!(campaign.current_goal_index(), Some(1));
    }

    #[test]
    fn rejects_unknown_status_byte() {
        let err = decode_campaign(
            Address::ZERO,
            details(
                vec![raw_goal("Semester 1", 9)],
                vec![U256::ZERO],
                vec![B256::ZERO],
            ),
        )
        .unwrap_err();
        assert!(matches!(err, ScholarError::InvalidStatus(9)));
    }

    #[test]
    fn rejects_mismatched_parallel_arrays() {
        let err = decode_campaign(
            Address::ZERO,
            details(vec![raw_goal("Semester 1", 0)], vec![], vec![B256::ZERO]),
        )
        .unwrap_err();
        assert!(matches!(err, ScholarError::Decode(_)));
    }

    #[test]
    fn rejects_non_utf8_name() {
        let mut goal = raw_goal("Semester 1", 0);
        goal.name = B256::repeat_byte(0xff);
        let err = decode_campaign(
            Address::ZERO,
            details(vec![goal], vec![U256::ZERO], vec![B256::ZERO]),
        )
        .unwrap_err();
        assert!(matches!(err, ScholarError::Decode(_)));
    }

    #[test]
    fn zero_uid_is_absent() {
        assert_eq!(uid_if_valid(B256::ZERO), None);
        let uid = B256::repeat_byte(1);
        assert_eq!(uid_if_valid(uid), Some(uid));
    }
}
