//! `caravel-agent` adapts inbound protocol messages onto the core APIs of
//! [`caravel_core`].
//!
//! An inbound message arrives as a typed [`messaging::envelope::Envelope`]
//! wrapped in an immutable [`messaging::context::RequestContext`]. The
//! [`messaging::dispatcher::Dispatcher`] resolves the matching handler from a
//! registry keyed by the message-type tag and invokes it; the handler drives
//! the credential-exchange state machine and may answer through the injected
//! [`messaging::types::Responder`].
//!
//! The secure channel itself (message framing and transport encryption) is an
//! external collaborator: this crate only consumes the `connection_ready`
//! outcome of it.
pub mod handler;
pub mod messaging;
