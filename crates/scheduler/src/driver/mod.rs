//! Queue driver -- the polling loop and the single-flight drain.
//!
//! Split into focused submodules:
//! - `core`: QueueDriver handle, construction, lifecycle, status accessors
//! - `polling`: pending-entity polling and deduplicated enqueue
//! - `drain`: single-flight drain pass over the queue

mod core;
mod drain;
mod polling;

pub use self::core::QueueDriver;
