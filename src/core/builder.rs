//! Builder for constructing an [`Observer`] with optional configuration.

use std::sync::Arc;

use crate::core::observer::{ErrorHook, Observer};
use crate::error::HandlerError;
use crate::scheduler::{Defer, Deferral};

/// Builder for an [`Observer`].
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use eventmatch::{Deferral, Observer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = Deferral::new();
/// let obj = Observer::builder()
///     .delimiter(":")
///     .error_hook(|err| eprintln!("{err}"))
///     .scheduler(Arc::new(queue.clone()))
///     .build();
/// # let _ = obj;
/// # }
/// ```
#[derive(Default)]
pub struct ObserverBuilder {
    delimiter: Option<String>,
    error_hook: Option<ErrorHook>,
    scheduler: Option<Arc<dyn Defer>>,
}

impl ObserverBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables hierarchical string-name splitting on this token.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Installs the hook receiving subscriber failures.
    pub fn error_hook(mut self, hook: impl Fn(HandlerError) + Send + Sync + 'static) -> Self {
        self.error_hook = Some(Arc::new(hook));
        self
    }

    /// Routes dispatch through the given scheduler.
    ///
    /// Observers sharing one scheduler interleave their dispatches in a
    /// single FIFO order.
    pub fn scheduler(mut self, scheduler: Arc<dyn Defer>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Builds the observer, spawning a private [`Deferral`] queue when no
    /// scheduler was given.
    pub fn build(self) -> Observer {
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(Deferral::new()));
        Observer::new_internal(self.delimiter, self.error_hook, scheduler)
    }
}
