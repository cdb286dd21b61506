// src/abi.rs
//! Contract bindings generated from the ABIs vendored with the original
//! deployment (campaign factory, per-campaign contract, EAS registry and
//! the mock IDRX ERC-20). Function signatures are fixed by those ABIs.

use alloy::sol;

sol! {
    #[sol(rpc)]
    contract CampaignFactory {
        struct Criteria {
            uint256 minGPA;
            bool passOrFail;
        }

        struct Goal {
            bytes32 name;
            uint256 target;
            Criteria criteria;
            uint8 status;
            uint256 sendToRecipient;
            uint256 sendToInstitution;
            address[] backers;
        }

        event CampaignCreated(address creator, address campaignContract);

        function createCampaign(
            bytes32 _name,
            address _institutionAddress,
            address _recipientAddress,
            Goal[] memory _goals
        ) external;

        function easAddress() external view returns (address);
        function erc20Address() external view returns (address);

        function getCampaignAddressFromInstitutionAddress(
            address _institutionAddress
        ) external view returns (address[] memory);

        function getCampaignAddressesFromRecipientAddress(
            address _recipientAddress
        ) external view returns (address[] memory);
    }
}

sol! {
    #[sol(rpc)]
    contract Campaign {
        struct Criteria {
            uint256 minGPA;
            bool passOrFail;
        }

        struct Goal {
            bytes32 name;
            uint256 target;
            Criteria criteria;
            uint8 status;
            uint256 sendToRecipient;
            uint256 sendToInstitution;
            address[] backers;
        }

        function getCampaignDetails() external view returns (
            bytes32,
            uint256,
            address,
            address,
            Goal[] memory,
            bytes32[] memory,
            uint256[] memory,
            bytes32,
            bool
        );

        function fund(uint256 _goalIndex, uint256 _amount) external;
        function getFundable(uint256 _goalIndex) external view returns (uint256);

        function attestAdmission(
            bytes32 _admissionAttestationUID,
            bytes _admissionAttestationEncodedData
        ) external;

        function revokeAdmission(bytes32 _revokedAttestationUID) external;

        function setGoalAttestation(
            bytes32 _goalAttestationUID,
            uint256 _goalIndex,
            bytes _goalAttestationEncodedData,
            uint256 gpa,
            bool passOrFail
        ) external;

        function admissionAttestation() external view returns (bytes32);
        function isAdmitted() external view returns (bool);
        function name() external view returns (bytes32);
        function id() external view returns (uint256);
        function institutionAddress() external view returns (address);
        function recipientAddress() external view returns (address);
        function parentAddress() external view returns (address);
        function eas() external view returns (address);
        function erc20() external view returns (address);
        function goals(uint256 index) external view returns (
            bytes32 name,
            uint256 target,
            Criteria memory criteria,
            uint8 status,
            uint256 sendToRecipient,
            uint256 sendToInstitution
        );
        function goalsAttestationUIDs(uint256 index) external view returns (bytes32);
        function goalBalances(uint256 index) external view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    contract IEAS {
        struct AttestationRequestData {
            address recipient;
            uint64 expirationTime;
            bool revocable;
            bytes32 refUID;
            bytes data;
            uint256 value;
        }

        struct AttestationRequest {
            bytes32 schema;
            AttestationRequestData data;
        }

        struct RevocationRequestData {
            bytes32 uid;
            uint256 value;
        }

        struct RevocationRequest {
            bytes32 schema;
            RevocationRequestData data;
        }

        event Attested(
            address indexed recipient,
            address indexed attester,
            bytes32 uid,
            bytes32 indexed schemaUID
        );

        event Revoked(
            address indexed recipient,
            address indexed attester,
            bytes32 uid,
            bytes32 indexed schemaUID
        );

        function attest(AttestationRequest calldata request) external payable returns (bytes32);
        function revoke(RevocationRequest calldata request) external payable;
    }
}

sol! {
    #[sol(rpc)]
    contract IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);

        // Mock IDRX faucet, test networks only
        function mint(address to, uint256 amount) external;
    }
}
