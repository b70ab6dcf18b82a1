//! Container Executor: runs docker tasks and meters their resource use
//! (spec.md §4.7).

pub mod executor;
pub mod limits;
pub mod logs;
pub mod metrics;

pub use executor::BollardExecutor;
