//! # Observer capability: subscription lifecycle, dispatch and IoC listening.
//!
//! [`Observer`] is the embeddable capability that turns a host type into a
//! publisher of pattern-matched events. Host types opt in by embedding it
//! and implementing [`Observable`](crate::Observable); nothing is patched
//! onto foreign objects.
//!
//! ## Architecture
//! ```text
//! on / once ──► Registry (lazy) ──► PatternStore
//!                   ▲                   │
//! off ──────────────┘                   │ ranked_matches(name)
//!                                       ▼
//! trigger(name) ──► match snapshot ──► one job per match ──► Defer queue
//!                   + shared stop token                          │
//!                                                                ▼
//!                                               stopped? ──► handler.call()
//!                                                             │
//!                                           Err / panic ──► error hook
//!                                                            (or warn log)
//! listen_to(src) ──► ListenMap (lazy) + src.on(pattern, handler, self)
//! stop_listening ──► src.off(..., self) per tracked source
//! ```
//!
//! ## Rules
//! - `trigger` never invokes a subscriber synchronously; it snapshots the
//!   ranked matches, returns, and the scheduler runs one isolated
//!   invocation per match in submission order.
//! - Registry mutation after a trigger's snapshot never affects that
//!   in-flight dispatch; `stop()` is the only way to skip scheduled
//!   invocations, and only within the same trigger call.
//! - The state lock is held only for short synchronous sections, never
//!   across a deferred job, a call into another observer, or a re-entrant
//!   call into this one.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::core::listening::ListenMap;
use crate::core::once::OnceHandler;
use crate::core::registry::{Registry, SubscriberEntry};
use crate::core::subscription::{Off, Subscription};
use crate::error::{panic_message, HandlerError};
use crate::events::MatchedEvent;
use crate::handlers::HandlerRef;
use crate::ids::{ContextId, HandlerId};
use crate::patterns::{Name, Pattern};
use crate::scheduler::Defer;

/// Hook receiving failures raised by subscriber callbacks.
pub(crate) type ErrorHook = Arc<dyn Fn(HandlerError) + Send + Sync>;

/// Mutable observer state, guarded by one lock.
struct State {
    /// Token splitting delimited names; `None` keeps names opaque.
    delimiter: Option<String>,
    /// Exists iff at least one subscription is live.
    registry: Option<Registry>,
    /// Exists iff at least one source is tracked via `listen_to`.
    listening: Option<ListenMap>,
    error_hook: Option<ErrorHook>,
}

pub(crate) struct Shared {
    ctx: ContextId,
    scheduler: Arc<dyn Defer>,
    state: Mutex<State>,
}

/// Pattern-matched observer capability.
///
/// Cheap to clone; clones share the same subscriptions, identity and
/// scheduler. Construct with [`Observer::new`] or, for a delimiter, error
/// hook or shared scheduler, through [`Observer::builder`].
///
/// Requires a Tokio runtime: the default scheduler spawns its worker task
/// at construction.
///
/// ## Example
/// ```rust
/// use eventmatch::{HandlerRef, Observer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let obj = Observer::new();
/// obj.on("event", HandlerRef::from_fn(|_event, _args| Ok(())));
/// obj.trigger("event"); // delivery is deferred, never synchronous
/// # }
/// ```
#[derive(Clone)]
pub struct Observer {
    shared: Arc<Shared>,
}

impl Observer {
    /// Creates an observer with default configuration: no delimiter, no
    /// error hook, a private [`Deferral`](crate::Deferral) queue.
    pub fn new() -> Self {
        crate::core::ObserverBuilder::new().build()
    }

    /// Starts a builder.
    pub fn builder() -> crate::core::ObserverBuilder {
        crate::core::ObserverBuilder::new()
    }

    pub(crate) fn new_internal(
        delimiter: Option<String>,
        error_hook: Option<ErrorHook>,
        scheduler: Arc<dyn Defer>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                ctx: ContextId::fresh(),
                scheduler,
                state: Mutex::new(State {
                    delimiter,
                    registry: None,
                    listening: None,
                    error_hook,
                }),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    // Recovers from poisoning: the lock is never held across callback
    // execution, only across short synchronous bookkeeping.
    fn state(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// This observer's process-wide identity token.
    ///
    /// Stable for the observer's lifetime; keys IoC tracking and serves
    /// as the default resolved context of its subscriptions.
    pub fn context_id(&self) -> ContextId {
        self.shared.ctx
    }

    /// Returns the configured name delimiter.
    pub fn delimiter(&self) -> Option<String> {
        self.state().delimiter.clone()
    }

    /// Sets or clears the name delimiter.
    ///
    /// Affects how *subsequent* `on`/`off`/`trigger` calls normalize
    /// token names; already-stored patterns are not rewritten.
    pub fn set_delimiter(&self, delimiter: Option<&str>) {
        self.state().delimiter = delimiter.map(str::to_owned);
    }

    /// Installs the hook receiving subscriber failures.
    ///
    /// Without a hook, failures are logged at `warn` and discarded.
    pub fn set_error_hook(&self, hook: impl Fn(HandlerError) + Send + Sync + 'static) {
        self.state().error_hook = Some(Arc::new(hook));
    }

    /// Removes the error hook.
    pub fn clear_error_hook(&self) {
        self.state().error_hook = None;
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.state().registry.as_ref().map_or(0, Registry::len)
    }

    /// Number of sources currently tracked via `listen_to`.
    pub fn listening_count(&self) -> usize {
        self.state().listening.as_ref().map_or(0, ListenMap::len)
    }

    // ---------------------------
    // Subscription lifecycle
    // ---------------------------

    /// Binds `handler` to every triggered name matching `pattern`.
    ///
    /// Token patterns are split into segments when a delimiter is
    /// configured. Returns a [`Subscription`] handle for exact removal
    /// through [`Observer::unsubscribe`].
    pub fn on(&self, pattern: impl Into<Pattern>, handler: impl Into<HandlerRef>) -> Subscription {
        self.register(pattern.into(), handler.into(), None)
    }

    /// Like [`Observer::on`], tagging the entry with an explicit context
    /// for bulk removal ([`Off::with_context`]) and IoC bookkeeping.
    pub fn on_with(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
        context: ContextId,
    ) -> Subscription {
        self.register(pattern.into(), handler.into(), Some(context))
    }

    /// Binds `handler` to fire at most once.
    ///
    /// The registration removes itself before the first invocation runs
    /// the wrapped handler; invocations already queued behind the first
    /// are no-ops. Removal by the original `handler` reference also
    /// removes the wrapper.
    pub fn once(&self, pattern: impl Into<Pattern>, handler: impl Into<HandlerRef>) -> Subscription {
        self.register_once(pattern.into(), handler.into(), None)
    }

    /// Single-shot registration with an explicit context.
    pub fn once_with(
        &self,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
        context: ContextId,
    ) -> Subscription {
        self.register_once(pattern.into(), handler.into(), Some(context))
    }

    /// Removes subscriptions per the [`Off`] criteria precedence:
    /// no registry → no-op; no criteria → discard the registry; pattern
    /// only → bulk removal under that pattern; handler or context →
    /// filtered removal over the scoped candidates.
    pub fn off(&self, criteria: Off) -> &Self {
        let mut state = self.state();
        if state.registry.is_none() {
            return self;
        }
        if criteria.is_empty() {
            state.registry = None;
            return self;
        }

        let Off {
            pattern,
            handler,
            context,
        } = criteria;
        let pattern = pattern.map(|p| p.normalized(state.delimiter.as_deref()));

        let emptied = match state.registry.as_mut() {
            Some(registry) => {
                if handler.is_none() && context.is_none() {
                    // Only a pattern: bulk removal, no per-entry filtering.
                    if let Some(pattern) = &pattern {
                        registry.remove_pattern(pattern);
                    }
                } else {
                    registry.remove_matching(pattern.as_ref(), handler, context);
                }
                registry.is_empty()
            }
            None => false,
        };
        if emptied {
            state.registry = None;
        }
        self
    }

    /// Removes the registration a [`Subscription`] handle points at.
    pub fn unsubscribe(&self, subscription: &Subscription) -> &Self {
        self.off(
            Off::new()
                .with_pattern(subscription.pattern().clone())
                .with_handler(subscription.handler()),
        )
    }

    fn register(
        &self,
        pattern: Pattern,
        handler: HandlerRef,
        context: Option<ContextId>,
    ) -> Subscription {
        let mut state = self.state();
        let pattern = pattern.normalized(state.delimiter.as_deref());
        let id = handler.id();

        let registry = state.registry.get_or_insert_with(Registry::new);
        registry.subscribe(
            pattern.clone(),
            SubscriberEntry {
                handler,
                context,
                resolved: context.unwrap_or(self.shared.ctx),
            },
        );
        Subscription::new(pattern, id)
    }

    fn register_once(
        &self,
        pattern: Pattern,
        handler: HandlerRef,
        context: Option<ContextId>,
    ) -> Subscription {
        let id = HandlerId::fresh();
        let adapter = OnceHandler::new(
            Arc::downgrade(&self.shared),
            pattern.clone(),
            id,
            handler.clone(),
        );
        let wrapped = HandlerRef::adapter(id, handler.id(), Arc::new(adapter));
        self.register(pattern, wrapped, context)
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Triggers `name` with no trailing arguments.
    pub fn trigger(&self, name: impl Into<Name>) -> &Self {
        self.trigger_with(name, Vec::new())
    }

    /// Fires every subscription matching `name`, best match first.
    ///
    /// Matches are ranked descending by specificity, ties broken by
    /// earliest registration, and one invocation per match is submitted
    /// to the scheduler in that order. The call returns before any of
    /// them has run. Each invocation checks the call's shared stop token
    /// immediately before running, then invokes the handler with the
    /// [`MatchedEvent`] and `args`; `Err` returns and panics go to the
    /// error hook (or the `warn` log) without affecting siblings.
    pub fn trigger_with(&self, name: impl Into<Name>, args: Vec<Value>) -> &Self {
        let name = name.into();

        let (name, items, hook) = {
            let state = self.state();
            let Some(registry) = state.registry.as_ref() else {
                return self;
            };
            let name = name.normalized(state.delimiter.as_deref());
            let items = registry.ranked(&name);
            (name, items, state.error_hook.clone())
        };
        if items.is_empty() {
            return self;
        }

        let stop = CancellationToken::new();
        let args: Arc<[Value]> = Arc::from(args);

        for item in items {
            let event = MatchedEvent::new(
                name.clone(),
                item.pattern,
                item.specificity,
                item.index,
                item.resolved,
                stop.clone(),
            );
            let handler = item.handler;
            let hook = hook.clone();
            let args = Arc::clone(&args);

            self.shared.scheduler.defer(Box::new(move || {
                if event.is_stopped() {
                    return;
                }
                let outcome = catch_unwind(AssertUnwindSafe(|| handler.call(&event, &args)));
                let failure = match outcome {
                    Ok(Ok(())) => None,
                    Ok(Err(err)) => Some(err),
                    Err(payload) => Some(HandlerError::panicked(panic_message(&*payload))),
                };
                if let Some(err) = failure {
                    match &hook {
                        Some(hook) => hook(err),
                        None => log::warn!("{}: {}", err.as_label(), err.as_message()),
                    }
                }
            }));
        }
        self
    }

    // ---------------------------
    // IoC listening
    // ---------------------------

    /// Subscribes this observer to `source`, tracking the relationship
    /// for later teardown through [`Observer::stop_listening`].
    ///
    /// The entry is placed on `source` with this observer's identity as
    /// its explicit context; `source`'s delimiter governs normalization.
    pub fn listen_to(
        &self,
        source: &Observer,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
    ) -> Subscription {
        self.track(source);
        source.on_with(pattern, handler, self.context_id())
    }

    /// Single-shot variant of [`Observer::listen_to`].
    pub fn listen_to_once(
        &self,
        source: &Observer,
        pattern: impl Into<Pattern>,
        handler: impl Into<HandlerRef>,
    ) -> Subscription {
        self.track(source);
        source.once_with(pattern, handler, self.context_id())
    }

    fn track(&self, source: &Observer) {
        let mut state = self.state();
        state
            .listening
            .get_or_insert_with(ListenMap::new)
            .insert(source.context_id(), Arc::downgrade(&source.shared));
    }

    /// Tears down subscriptions this observer placed on other objects.
    ///
    /// Scopes to `source` when given, else to every tracked source. The
    /// `pattern`/`handler` criteria narrow which entries are removed;
    /// the context criterion is always this observer's identity. A
    /// source is dropped from tracking when the stop was unscoped or
    /// when it no longer holds any entry placed by this observer. The
    /// pattern is normalized with *this* observer's delimiter.
    pub fn stop_listening(&self, source: Option<&Observer>, criteria: Off) -> &Self {
        let scoped: Vec<(ContextId, Weak<Shared>)> = {
            let state = self.state();
            let Some(map) = state.listening.as_ref() else {
                return self;
            };
            match source {
                Some(source) => vec![(source.context_id(), Arc::downgrade(&source.shared))],
                None => map.snapshot(),
            }
        };

        let full_stop = criteria.pattern.is_none() && criteria.handler.is_none();
        let delimiter = self.delimiter();
        let pattern = criteria
            .pattern
            .map(|p| p.normalized(delimiter.as_deref()));

        let mut dropped = Vec::new();
        for (id, weak) in scoped {
            match weak.upgrade() {
                None => dropped.push(id),
                Some(shared) => {
                    let src = Observer::from_shared(shared);
                    src.off(Off {
                        pattern: pattern.clone(),
                        handler: criteria.handler,
                        context: Some(self.context_id()),
                    });
                    if full_stop || !src.has_context(self.context_id()) {
                        dropped.push(id);
                    }
                }
            }
        }

        if !dropped.is_empty() {
            let mut state = self.state();
            let emptied = match state.listening.as_mut() {
                Some(map) => {
                    for id in &dropped {
                        map.remove(id);
                    }
                    map.is_empty()
                }
                None => false,
            };
            if emptied {
                state.listening = None;
            }
        }
        self
    }

    /// True when any live entry was registered with `context` explicitly.
    pub(crate) fn has_context(&self, context: ContextId) -> bool {
        self.state()
            .registry
            .as_ref()
            .is_some_and(|r| r.has_context(context))
    }

    #[cfg(test)]
    fn has_registry(&self) -> bool {
        self.state().registry.is_some()
    }

    #[cfg(test)]
    fn has_listening(&self) -> bool {
        self.state().listening.is_some()
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("context_id", &self.shared.ctx)
            .finish_non_exhaustive()
    }
}
