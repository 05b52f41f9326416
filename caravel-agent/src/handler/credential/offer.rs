use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;

use caravel_core::identity::verifiable::credential::messages::{
    CredentialOffer, CredentialRequest, TypedMessage,
};
use caravel_core::identity::verifiable::credential::types::ExchangeAPI;
use caravel_core::identity::verifiable::CredentialExchange;

use crate::messaging::context::{RequestContext, SETTING_AUTO_RESPOND_CREDENTIAL_OFFER};
use crate::messaging::envelope::Envelope;
use crate::messaging::trace::{trace_event, TraceTimer};
use crate::messaging::types::{MessageHandler, MessagingError, Responder};

/// Handler for inbound `issue-credential/1.0/offer-credential` messages.
///
/// The offer is recorded on its exchange through
/// [`ExchangeAPI::receive_offer`]. When the `auto_respond.credential_offer`
/// flag is set, the handler immediately answers with a credential request for
/// the connection's own DID, synchronously within the same handling
/// invocation.
pub struct CredentialOfferHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    exchange: TExchange,
}

impl<TExchange> CredentialOfferHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    pub fn new(exchange: TExchange) -> Self {
        Self { exchange }
    }
}

#[async_trait]
impl<TExchange> MessageHandler for CredentialOfferHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange> + Send + Sync,
{
    async fn handle(
        &self,
        context: &RequestContext,
        responder: &dyn Responder,
    ) -> Result<(), MessagingError> {
        let timer = TraceTimer::start();

        let offer: CredentialOffer = context.get_message().open()?;
        debug!(
            "[handler:offer-credential] offer on thread: {}",
            String::from(offer.get_thread_id())
        );

        if !context.connection_ready() {
            return Err(MessagingError::HandlerError(
                "no connection established for credential offer".to_string(),
            ));
        }

        let connection = context.get_connection().ok_or_else(|| {
            MessagingError::HandlerError("context carries no connection record".to_string())
        })?;

        let exchange = self
            .exchange
            .receive_offer(offer, connection.get_id())
            .await?;

        trace_event(
            context.get_settings(),
            &CredentialOffer::message_type(),
            "CredentialOfferHandler.handle.END",
            &timer,
        );

        // the continuation runs synchronously inside this same invocation, on
        // the same timer, so its checkpoint reports accumulated elapsed time
        if context
            .get_settings()
            .get_flag(SETTING_AUTO_RESPOND_CREDENTIAL_OFFER)
        {
            let (_, request) = self
                .exchange
                .create_request(exchange, connection.get_own_did())
                .await?;

            responder.send_reply(Envelope::pack(&request)?).await?;

            trace_event(
                context.get_settings(),
                &CredentialRequest::message_type(),
                "CredentialOfferHandler.handle.REQUEST",
                &timer,
            );
        }

        Ok(())
    }
}
