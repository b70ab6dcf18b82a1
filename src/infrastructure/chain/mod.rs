//! On-chain collaborator: stake queries and reward payout (spec.md §4.5,
//! §6's contract surface).

pub mod client;
pub mod contract;
pub mod reward_dispatcher;
pub mod stake_oracle;

pub use client::ChainClient;
pub use reward_dispatcher::ChainRewardDispatcher;
pub use stake_oracle::ChainStakeOracle;
