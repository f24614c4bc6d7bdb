//! # Host-type attachment trait.
//!
//! [`Observable`] gives a host type the full observer surface through
//! provided methods, in exchange for exposing its embedded [`Observer`].
//!
//! ## Example
//! ```rust
//! use eventmatch::{HandlerRef, Observable, Observer};
//!
//! struct Vault {
//!     observer: Observer,
//! }
//!
//! impl Observable for Vault {
//!     fn observer(&self) -> &Observer {
//!         &self.observer
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let vault = Vault { observer: Observer::new() };
//! vault.on("unlocked", HandlerRef::from_fn(|_event, _args| Ok(())));
//! vault.trigger("unlocked");
//! # }
//! ```

use serde_json::Value;

use crate::core::observer::Observer;
use crate::core::subscription::{Off, Subscription};
use crate::handlers::HandlerRef;
use crate::ids::ContextId;
use crate::patterns::{Name, Pattern};

/// Observer capability surface for host types.
///
/// Implementors supply [`Observable::observer`]; every other method is
/// provided and delegates to it. See [`Observer`] for the contracts.
pub trait Observable {
    /// The embedded observer capability.
    fn observer(&self) -> &Observer;

    /// See [`Observer::on`].
    fn on(&self, pattern: impl Into<Pattern>, handler: impl Into<HandlerRef>) -> Subscription {
        self.observer().on(pattern, handler)
    }

    /// See [`Observer::on_with`].
    fn on_with(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
        context: ContextId,
    ) -> Subscription {
        self.observer().on_with(pattern, handler, context)
    }

    /// See [`Observer::once`].
    fn once(&self, pattern: impl Into<Pattern>, handler: impl Into<HandlerRef>) -> Subscription {
        self.observer().once(pattern, handler)
    }

    /// See [`Observer::once_with`].
    fn once_with(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
        context: ContextId,
    ) -> Subscription {
        self.observer().once_with(pattern, handler, context)
    }

    /// See [`Observer::off`].
    fn off(&self, criteria: Off) -> &Self {
        self.observer().off(criteria);
        self
    }

    /// See [`Observer::unsubscribe`].
    fn unsubscribe(&self, subscription: &Subscription) -> &Self {
        self.observer().unsubscribe(subscription);
        self
    }

    /// See [`Observer::trigger`].
    fn trigger(&self, name: impl Into<Name>) -> &Self {
        self.observer().trigger(name);
        self
    }

    /// See [`Observer::trigger_with`].
    fn trigger_with(&self, name: impl Into<Name>, args: Vec<Value>) -> &Self {
        self.observer().trigger_with(name, args);
        self
    }

    /// See [`Observer::listen_to`].
    fn listen_to(
        &self,
        source: &impl Observable,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
    ) -> Subscription {
        self.observer().listen_to(source.observer(), pattern, handler)
    }

    /// See [`Observer::listen_to_once`].
    fn listen_to_once(
        &self,
        source: &impl Observable,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
    ) -> Subscription {
        self.observer()
            .listen_to_once(source.observer(), pattern, handler)
    }

    /// See [`Observer::stop_listening`].
    fn stop_listening(&self, source: Option<&Observer>, criteria: Off) -> &Self {
        self.observer().stop_listening(source, criteria);
        self
    }

    /// See [`Observer::context_id`].
    fn context_id(&self) -> ContextId {
        self.observer().context_id()
    }
}

impl Observable for Observer {
    fn observer(&self) -> &Observer {
        self
    }
}
