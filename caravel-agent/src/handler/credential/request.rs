use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::{Map, Value};
use rst_common::with_logging::log::debug;

use caravel_core::identity::verifiable::credential::messages::{
    CredentialIssue, CredentialRequest, TypedMessage,
};
use caravel_core::identity::verifiable::credential::types::{ExchangeAPI, ExchangeEntityAccessor};
use caravel_core::identity::verifiable::CredentialExchange;

use crate::messaging::context::{
    RequestContext, SETTING_AUTO_RESPOND_CREDENTIAL_REQUEST, SETTING_ISSUE_SIGNATURE_TYPE,
};
use crate::messaging::envelope::Envelope;
use crate::messaging::trace::{trace_event, TraceTimer};
use crate::messaging::types::{MessageHandler, MessagingError, Responder};

/// Handler for inbound `issue-credential/1.0/request-credential` messages
/// (issuer side).
///
/// When the `auto_respond.credential_request` flag is set, the credential is
/// issued right away with the claims from the stored offer preview, signed
/// under the suite named by `issue.signature_type` when that key is present.
pub struct CredentialRequestHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    exchange: TExchange,
}

impl<TExchange> CredentialRequestHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    pub fn new(exchange: TExchange) -> Self {
        Self { exchange }
    }
}

#[async_trait]
impl<TExchange> MessageHandler for CredentialRequestHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange> + Send + Sync,
{
    async fn handle(
        &self,
        context: &RequestContext,
        responder: &dyn Responder,
    ) -> Result<(), MessagingError> {
        let timer = TraceTimer::start();

        let request: CredentialRequest = context.get_message().open()?;
        debug!(
            "[handler:request-credential] request on thread: {}",
            String::from(request.get_thread_id())
        );

        if !context.connection_ready() {
            return Err(MessagingError::HandlerError(
                "no connection established for credential request".to_string(),
            ));
        }

        let connection = context.get_connection().ok_or_else(|| {
            MessagingError::HandlerError("context carries no connection record".to_string())
        })?;

        let exchange = self.exchange.receive_request(request).await?;

        trace_event(
            context.get_settings(),
            &CredentialRequest::message_type(),
            "CredentialRequestHandler.handle.END",
            &timer,
        );

        if context
            .get_settings()
            .get_flag(SETTING_AUTO_RESPOND_CREDENTIAL_REQUEST)
        {
            let claims = exchange
                .get_offer()
                .map(|offer| offer.get_credential_preview())
                .unwrap_or_else(|| Value::Object(Map::new()));

            let signature_type = context
                .get_settings()
                .get(SETTING_ISSUE_SIGNATURE_TYPE)
                .map(String::from);

            let (_, issue) = self
                .exchange
                .issue_credential(exchange, connection.get_own_did(), claims, signature_type)
                .await?;

            responder.send_reply(Envelope::pack(&issue)?).await?;

            trace_event(
                context.get_settings(),
                &CredentialIssue::message_type(),
                "CredentialRequestHandler.handle.ISSUE",
                &timer,
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::serde_json::json;
    use rst_common::with_tokio::tokio;

    use caravel_core::identity::verifiable::credential::messages::CredentialOffer;
    use caravel_core::identity::verifiable::credential::types::ThreadID;
    use caravel_core::identity::verifiable::ExchangeState;

    use crate::handler::credential::tests::{
        generate_context, MockFakeExchange, MockFakeResponder,
    };
    use crate::messaging::context::Settings;

    fn generate_request() -> CredentialRequest {
        CredentialRequest::new(ThreadID::generate(), "did:example:peer".to_string())
    }

    fn generate_requested_exchange(thread_id: ThreadID) -> CredentialExchange {
        let mut exchange = CredentialExchange::new(
            thread_id.clone(),
            "connection-001".to_string(),
            ExchangeState::RequestReceived,
        );
        exchange.set_offer(CredentialOffer::new(
            Some(thread_id),
            json!({"name": "alice"}),
        ));
        exchange
    }

    #[tokio::test]
    async fn test_handle_without_connection_rejected() {
        let context = generate_context(
            Envelope::pack(&generate_request()).unwrap(),
            false,
            Settings::new(),
        );

        let handler = CredentialRequestHandler::new(MockFakeExchange::new());
        let handled = handler.handle(&context, &MockFakeResponder::new()).await;

        assert_eq!(
            handled.unwrap_err(),
            MessagingError::HandlerError(
                "no connection established for credential request".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_handle_records_request_without_auto_respond() {
        let context = generate_context(
            Envelope::pack(&generate_request()).unwrap(),
            true,
            Settings::new(),
        );

        let mut exchange = MockFakeExchange::new();
        exchange
            .expect_receive_request()
            .times(1)
            .returning(|request| Ok(generate_requested_exchange(request.get_thread_id())));

        let handler = CredentialRequestHandler::new(exchange);
        let handled = handler.handle(&context, &MockFakeResponder::new()).await;

        assert!(handled.is_ok());
    }

    #[tokio::test]
    async fn test_handle_auto_respond_issues_credential() {
        let settings = Settings::new()
            .with(SETTING_AUTO_RESPOND_CREDENTIAL_REQUEST, "true")
            .with(SETTING_ISSUE_SIGNATURE_TYPE, "StubSignature2024");
        let context = generate_context(
            Envelope::pack(&generate_request()).unwrap(),
            true,
            settings,
        );

        let mut exchange = MockFakeExchange::new();
        exchange
            .expect_receive_request()
            .times(1)
            .returning(|request| Ok(generate_requested_exchange(request.get_thread_id())));
        exchange
            .expect_issue_credential()
            .times(1)
            .withf(|_, did_issuer, claims, signature_type| {
                did_issuer.as_str() == "did:example:own"
                    && claims == &json!({"name": "alice"})
                    && signature_type == &Some("StubSignature2024".to_string())
            })
            .returning(|mut record, _, claims, _| {
                record.transition(ExchangeState::CredentialIssued).unwrap();
                let issue = CredentialIssue::new(record.get_thread_id(), claims);
                Ok((record, issue))
            });

        let mut responder = MockFakeResponder::new();
        responder
            .expect_send_reply()
            .times(1)
            .withf(|envelope| envelope.get_message_type() == CredentialIssue::message_type())
            .returning(|_| Ok(()));

        let handler = CredentialRequestHandler::new(exchange);
        let handled = handler.handle(&context, &responder).await;

        assert!(handled.is_ok());
    }
}
