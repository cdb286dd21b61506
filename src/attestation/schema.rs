// src/attestation/schema.rs
//! Schema-encoded attestation payloads. The registry schema is
//! `bytes32 type` for admission and `bytes32 type, uint256 gpa` for goal
//! attestations; encoding is plain ABI encoding of those fields.

use alloy_primitives::{B256, Bytes, U256};
use alloy_sol_types::SolValue;

pub const ADMISSION_TYPE: &str = "admission";
pub const GOAL_TYPE: &str = "goal";

// Markers are short ASCII constants, padding can't fail
fn type_marker(kind: &str) -> B256 {
    let mut out = [0u8; 32];
    out[..kind.len()].copy_from_slice(kind.as_bytes());
    B256::from(out)
}

/// Payload for an admission attestation: `(bytes32 "admission")`
pub fn encode_admission_data() -> Bytes {
    type_marker(ADMISSION_TYPE).abi_encode().into()
}

/// Payload for a goal attestation: `(bytes32 "goal", uint256 gpa)` with the
/// GPA already scaled by 100
pub fn encode_goal_data(gpa_raw: u64) -> Bytes {
    (type_marker(GOAL_TYPE), U256::from(gpa_raw))
        .abi_encode()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_payload_is_one_padded_word() {
        let data = encode_admission_data();
        assert_eq!(data.len(), 32);
        assert_eq!(&data[..9], b"admission");
        assert!(data[9..].iter().all(|b| *b == 0));
    }

    #[test]
    fn goal_payload_carries_scaled_gpa() {
        let data = encode_goal_data(325);
        assert_eq!(data.len(), 64);
        assert_eq!(&data[..4], b"goal");
        assert!(data[4..32].iter().all(|b| *b == 0));
        // 325 = 0x0145, big-endian in the second word
        assert_eq!(data[62], 0x01);
        assert_eq!(data[63], 0x45);
    }
}
