//! # eventmatch
//!
//! **eventmatch** turns any object into a publisher of pattern-matched
//! observer events.
//!
//! Subscriptions are matched against triggered names not just by exact
//! name but by best pattern match, with deterministic ordering when
//! several subscriptions match. Delivery is deferred to the next
//! scheduling opportunity, subscriber failures are isolated from each
//! other, and propagation to remaining matches can be halted mid-dispatch.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        on / once                      off
//!            │                           │
//!            ▼                           ▼
//! ┌───────────────────────────────────────────────────┐
//! │  Observer (embeddable capability)                 │
//! │  - Registry (lazy; insertion counter)             │
//! │  - PatternStore (pattern → entries, ranked match) │
//! │  - ListenMap (lazy; IoC tracking)                 │
//! └──────────────────────┬────────────────────────────┘
//!      trigger(name)     │
//!                        ▼
//!          ranked match snapshot + shared stop token
//!                        │ one job per match
//!                        ▼
//! ┌───────────────────────────────────────────────────┐
//! │  Defer queue (FIFO across all sharing observers)  │
//! └──────────────────────┬────────────────────────────┘
//!                        ▼
//!        stopped? ──► handler.call(event, args)
//!                        │
//!        Err / panic ──► error hook (or warn log)
//! ```
//!
//! ### Dispatch ordering
//! - Matches of one `trigger` call run descending by **specificity** (how
//!   precisely the stored pattern matches the triggered name), ties broken
//!   by earliest registration.
//! - Across trigger calls, invocations interleave strictly by submission
//!   order on the shared queue; there is no event priority.
//! - [`MatchedEvent::stop`] skips every not-yet-run invocation of the same
//!   trigger call and nothing else.
//!
//! ## Features
//! | Area             | Description                                                    | Key types / traits                  |
//! |------------------|----------------------------------------------------------------|-------------------------------------|
//! | **Subscribing**  | Bind handlers by token, delimited name or key/value pattern.   | [`Observable`], [`Pattern`]         |
//! | **Dispatch**     | Deferred, ranked, stoppable, failure-isolated delivery.        | [`MatchedEvent`], [`Defer`]         |
//! | **Removal**      | Multi-criteria `off` plus exact handles.                       | [`Off`], [`Subscription`]           |
//! | **IoC listening**| Track subscriptions placed on other objects, bulk teardown.    | [`Observer::listen_to`]             |
//! | **Handlers**     | Closure-backed or custom callback types with stable identity.  | [`Handle`], [`HandlerRef`]          |
//! | **Errors**       | Typed pattern-construction and handler-failure errors.         | [`PatternError`], [`HandlerError`]  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventmatch::{Deferral, HandlerRef, Name, Observer, Pattern};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = Deferral::new();
//!     let object = Observer::builder().scheduler(Arc::new(queue.clone())).build();
//!
//!     object.on(
//!         Pattern::from_json(&json!({"buzz": 2}))?,
//!         HandlerRef::from_fn(|_event, _args| {
//!             println!("buzz");
//!             Ok(())
//!         }),
//!     );
//!     object.on(
//!         Pattern::from_json(&json!({"fizz": 1, "buzz": 2}))?,
//!         HandlerRef::from_fn(|event, _args| {
//!             println!("fizzbuzz (specificity {})", event.specificity());
//!             Ok(())
//!         }),
//!     );
//!
//!     // The most specific match fires first: fizzbuzz, then buzz.
//!     object.trigger(Name::from_json(&json!({"fizz": 1, "buzz": 2}))?);
//!
//!     queue.flush().await;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod handlers;
mod ids;
mod patterns;
mod scheduler;

// ---- Public re-exports ----

pub use crate::core::{Observable, Observer, ObserverBuilder, Off, Subscription};
pub use error::{HandlerError, PatternError};
pub use events::MatchedEvent;
pub use handlers::{Handle, HandlerFn, HandlerRef};
pub use ids::{ContextId, HandlerId};
pub use patterns::{Name, Pattern, PatternStore, Ranked, ValuePattern};
pub use scheduler::{Defer, Deferral, Job};
