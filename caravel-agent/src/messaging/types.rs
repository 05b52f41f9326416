use rst_common::standard::async_trait::async_trait;
use rst_common::with_errors::thiserror::{self, Error};

use caravel_core::identity::verifiable::credential::types::CredentialError;
use caravel_core::identity::verifiable::proof::types::ProofError;

use super::context::RequestContext;
use super::envelope::Envelope;

/// `MessagingError` is the base error type of the dispatch layer.
///
/// Errors raised below it (the exchange state machine, the proof resolver)
/// pass through the transparent variants unmodified; the dispatch layer never
/// retries on their behalf.
#[derive(Debug, PartialEq, Error, Clone)]
pub enum MessagingError {
    #[error("handler error: {0}")]
    HandlerError(String),

    #[error("no handler registered for message type: {0}")]
    UnknownMessageType(String),

    #[error("message mismatch: {0}")]
    MessageMismatch(String),

    #[error("send error: {0}")]
    SendError(String),

    #[error(transparent)]
    ExchangeError(#[from] CredentialError),

    #[error(transparent)]
    ProofError(#[from] ProofError),
}

/// `MessageHandler` is the single capability a handler is polymorphic over.
///
/// Handling is an asynchronous, suspension-capable operation: it may suspend
/// during storage I/O or outbound sends without blocking concurrent handling
/// of other messages.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(
        &self,
        context: &RequestContext,
        responder: &dyn Responder,
    ) -> Result<(), MessagingError>;
}

/// `Responder` delivers a reply message back over the originating secure
/// channel. The concrete implementation belongs to the transport collaborator.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn send_reply(&self, envelope: Envelope) -> Result<(), MessagingError>;
}
