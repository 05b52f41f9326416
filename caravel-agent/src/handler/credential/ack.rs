use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;

use caravel_core::identity::verifiable::credential::messages::{CredentialAck, TypedMessage};
use caravel_core::identity::verifiable::credential::types::ExchangeAPI;
use caravel_core::identity::verifiable::CredentialExchange;

use crate::messaging::context::RequestContext;
use crate::messaging::trace::{trace_event, TraceTimer};
use crate::messaging::types::{MessageHandler, MessagingError, Responder};

/// Handler for inbound `issue-credential/1.0/ack` messages (issuer side).
/// Closes the exchange; there is no continuation to run.
pub struct CredentialAckHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    exchange: TExchange,
}

impl<TExchange> CredentialAckHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    pub fn new(exchange: TExchange) -> Self {
        Self { exchange }
    }
}

#[async_trait]
impl<TExchange> MessageHandler for CredentialAckHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange> + Send + Sync,
{
    async fn handle(
        &self,
        context: &RequestContext,
        _responder: &dyn Responder,
    ) -> Result<(), MessagingError> {
        let timer = TraceTimer::start();

        let ack: CredentialAck = context.get_message().open()?;
        debug!(
            "[handler:ack] ack on thread: {}",
            String::from(ack.get_thread_id())
        );

        if !context.connection_ready() {
            return Err(MessagingError::HandlerError(
                "no connection established for credential ack".to_string(),
            ));
        }

        let _ = self.exchange.receive_ack(ack).await?;

        trace_event(
            context.get_settings(),
            &CredentialAck::message_type(),
            "CredentialAckHandler.handle.END",
            &timer,
        );

        Ok(())
    }
}
