//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(&MatchedEvent, &[Value])`, the
//! cheapest way to get a [`Handle`] implementation. State shared with the
//! rest of the program goes through an explicit `Arc<...>` inside the
//! closure.
//!
//! ## Example
//! ```rust
//! use eventmatch::{HandlerError, HandlerFn, HandlerRef, MatchedEvent};
//! use serde_json::Value;
//!
//! let target = HandlerFn::arc(
//!     |event: &MatchedEvent, _args: &[Value]| -> Result<(), HandlerError> {
//!         println!("matched {:?}", event.matched());
//!         Ok(())
//!     },
//! );
//! let handler = HandlerRef::new(target);
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::error::HandlerError;
use crate::events::MatchedEvent;
use crate::handlers::handler::Handle;

/// Function-backed handler implementation.
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need an
    /// `Arc<dyn Handle>`.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared target.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> Handle for HandlerFn<F>
where
    F: Fn(&MatchedEvent, &[Value]) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn call(&self, event: &MatchedEvent, args: &[Value]) -> Result<(), HandlerError> {
        (self.f)(event, args)
    }
}
