use std::collections::HashMap;
use std::sync::Arc;

use rst_common::with_logging::log::{debug, warn};

use caravel_core::identity::verifiable::credential::messages::MessageType;

use super::context::RequestContext;
use super::types::{MessageHandler, MessagingError, Responder};

/// `HandlerRegistry` maps message-type tags onto their handlers.
///
/// The registry is built once at agent construction and read-only afterwards,
/// so it can be shared and read concurrently without synchronization.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, message_type: MessageType, handler: Arc<dyn MessageHandler>) {
        self.handlers.insert(message_type.to_string(), handler);
    }

    pub fn resolve(&self, message_type: &MessageType) -> Option<Arc<dyn MessageHandler>> {
        self.handlers.get(&message_type.to_string()).cloned()
    }
}

/// `Dispatcher` resolves the handler for an inbound message and invokes it.
///
/// An unresolved tag is a dispatch-level error: the message reaches no
/// handler. A handler error is logged and surfaced unmodified to whatever
/// invoked the dispatch; no retry happens at this layer (redelivery policy
/// belongs to the transport collaborator).
#[derive(Clone)]
pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub async fn dispatch(
        &self,
        context: &RequestContext,
        responder: &dyn Responder,
    ) -> Result<(), MessagingError> {
        let message_type = context.get_message().get_message_type();

        let handler = self
            .registry
            .resolve(&message_type)
            .ok_or_else(|| MessagingError::UnknownMessageType(message_type.to_string()))?;

        debug!("[dispatch] message type: {}", message_type);

        handler.handle(context, responder).await.map_err(|err| {
            warn!("[dispatch] handler failed: {} | {}", message_type, err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use rst_common::standard::async_trait::async_trait;
    use rst_common::standard::serde_json::json;
    use rst_common::with_tokio::tokio;

    use caravel_core::identity::verifiable::credential::messages::{
        CredentialOffer, TypedMessage,
    };

    use crate::messaging::context::Settings;
    use crate::messaging::envelope::Envelope;

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MessageHandler for CountingHandler {
        async fn handle(
            &self,
            _context: &RequestContext,
            _responder: &dyn Responder,
        ) -> Result<(), MessagingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl MessageHandler for FailingHandler {
        async fn handle(
            &self,
            _context: &RequestContext,
            _responder: &dyn Responder,
        ) -> Result<(), MessagingError> {
            Err(MessagingError::HandlerError(
                "no connection established".to_string(),
            ))
        }
    }

    struct NullResponder;

    #[async_trait]
    impl Responder for NullResponder {
        async fn send_reply(&self, _envelope: Envelope) -> Result<(), MessagingError> {
            Ok(())
        }
    }

    fn generate_context() -> RequestContext {
        let offer = CredentialOffer::new(None, json!({"name": "alice"}));
        RequestContext::new(Envelope::pack(&offer).unwrap(), Settings::new())
    }

    #[tokio::test]
    async fn test_dispatch_resolves_registered_handler() {
        let calls = Arc::new(AtomicUsize::new(0));

        let mut registry = HandlerRegistry::new();
        registry.register(
            CredentialOffer::message_type(),
            Arc::new(CountingHandler {
                calls: calls.clone(),
            }),
        );

        let dispatcher = Dispatcher::new(registry);
        let dispatched = dispatcher.dispatch(&generate_context(), &NullResponder).await;

        assert!(dispatched.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tag() {
        let dispatcher = Dispatcher::new(HandlerRegistry::new());
        let dispatched = dispatcher.dispatch(&generate_context(), &NullResponder).await;

        assert_eq!(
            dispatched.unwrap_err(),
            MessagingError::UnknownMessageType(CredentialOffer::message_type().to_string())
        );
    }

    #[tokio::test]
    async fn test_dispatch_propagates_handler_error_unmodified() {
        let mut registry = HandlerRegistry::new();
        registry.register(CredentialOffer::message_type(), Arc::new(FailingHandler));

        let dispatcher = Dispatcher::new(registry);
        let dispatched = dispatcher.dispatch(&generate_context(), &NullResponder).await;

        assert_eq!(
            dispatched.unwrap_err(),
            MessagingError::HandlerError("no connection established".to_string())
        );
    }
}
