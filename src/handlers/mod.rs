//! Subscriber callbacks: the [`Handle`] trait, the function-backed
//! [`HandlerFn`] and the identity-carrying [`HandlerRef`].

mod handler;
mod handler_fn;
mod handler_ref;

pub use handler::Handle;
pub use handler_fn::HandlerFn;
pub use handler_ref::HandlerRef;
