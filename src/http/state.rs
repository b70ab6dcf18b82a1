use std::sync::Arc;

use crate::domain::ports::{RewardDispatcher, StakeOracle, TaskRepository};
use crate::infrastructure::push::FanOut;
use crate::services::TaskService;

#[derive(Clone)]
pub struct AppState {
    pub task_service: Arc<TaskService>,
    pub task_repo: Arc<dyn TaskRepository>,
    pub stake_oracle: Arc<dyn StakeOracle>,
    pub reward_dispatcher: Arc<dyn RewardDispatcher>,
    pub fanout: Arc<FanOut>,
}
