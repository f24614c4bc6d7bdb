//! Deferred execution: the [`Defer`] contract and the default
//! [`Deferral`] FIFO queue.

mod defer;
mod deferral;

pub use defer::{Defer, Job};
pub use deferral::Deferral;
