//! Typed binding for the stake/reward contract's call interface (spec.md
//! §6's "on-chain collaborator contract surface"). The contract itself is
//! out of scope — this is just the ABI `runnerd` calls against.

use ethers::contract::abigen;

abigen!(
    StakeRegistry,
    r#"[
        function getStakeInfo(bytes32 deviceIdHash) external view returns (uint256 amount, address staker, bool exists)
        function getBalanceByDeviceId(bytes32 deviceIdHash) external view returns (uint256)
        function transferPayment(bytes32 creatorDeviceId, bytes32 runnerDeviceId, uint256 amountBase) external
        function stake(bytes32 deviceIdHash, uint256 amountBase) external
    ]"#
);
