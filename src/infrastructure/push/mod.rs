//! Push Fan-Out and Liveness Monitor (spec.md §4.2, §4.3).

pub mod fanout;
pub mod liveness;
pub mod target;

pub use fanout::FanOut;
pub use liveness::LivenessMonitor;
pub use target::PushTarget;
