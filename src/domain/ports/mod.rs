//! Domain ports (interfaces) for the task coordination and execution plane.

pub mod container_executor;
pub mod content_store;
pub mod reward_dispatcher;
pub mod stake_oracle;
pub mod task_change_emitter;
pub mod task_repository;
pub mod task_result_repository;

pub use container_executor::{ContainerExecutor, ExecutionOutcome};
pub use content_store::ContentStore;
pub use reward_dispatcher::{NullRewardDispatcher, RewardDispatcher};
pub use stake_oracle::{StakeInfo, StakeOracle};
pub use task_change_emitter::TaskChangeEmitter;
pub use task_repository::TaskRepository;
pub use task_result_repository::TaskResultRepository;
