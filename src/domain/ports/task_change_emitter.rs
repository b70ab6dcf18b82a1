//! Task-change emitter: the seam that breaks the handler/service cycle
//! described in spec.md §9.
//!
//! The Task Service only knows about this one-method capability; the Push
//! Fan-Out component implements it and owns the actual delivery mechanics
//! independently, so there is no cycle in the data-flow graph.

/// A single coalescing signal. Implementations must make repeated calls to
/// `signal()` cheap and non-blocking — the fan-out component coalesces
/// bursts of signals into a single in-flight delivery round.
pub trait TaskChangeEmitter: Send + Sync {
    fn signal(&self);
}
