use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;

use caravel_core::identity::verifiable::credential::messages::{
    CredentialAck, CredentialIssue, TypedMessage,
};
use caravel_core::identity::verifiable::credential::types::ExchangeAPI;
use caravel_core::identity::verifiable::CredentialExchange;

use crate::messaging::context::{RequestContext, SETTING_AUTO_RESPOND_CREDENTIAL_ISSUE};
use crate::messaging::envelope::Envelope;
use crate::messaging::trace::{trace_event, TraceTimer};
use crate::messaging::types::{MessageHandler, MessagingError, Responder};

/// Handler for inbound `issue-credential/1.0/issue-credential` messages
/// (holder side).
///
/// The received credential document goes through
/// [`ExchangeAPI::receive_credential`], which checks its integrity proof
/// before storing it. When the `auto_respond.credential_issue` flag is set,
/// the handler closes the exchange with an ack.
pub struct CredentialIssueHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    exchange: TExchange,
}

impl<TExchange> CredentialIssueHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange>,
{
    pub fn new(exchange: TExchange) -> Self {
        Self { exchange }
    }
}

#[async_trait]
impl<TExchange> MessageHandler for CredentialIssueHandler<TExchange>
where
    TExchange: ExchangeAPI<EntityAccessor = CredentialExchange> + Send + Sync,
{
    async fn handle(
        &self,
        context: &RequestContext,
        responder: &dyn Responder,
    ) -> Result<(), MessagingError> {
        let timer = TraceTimer::start();

        let issue: CredentialIssue = context.get_message().open()?;
        debug!(
            "[handler:issue-credential] credential on thread: {}",
            String::from(issue.get_thread_id())
        );

        if !context.connection_ready() {
            return Err(MessagingError::HandlerError(
                "no connection established for credential issue".to_string(),
            ));
        }

        let exchange = self.exchange.receive_credential(issue).await?;

        trace_event(
            context.get_settings(),
            &CredentialIssue::message_type(),
            "CredentialIssueHandler.handle.END",
            &timer,
        );

        if context
            .get_settings()
            .get_flag(SETTING_AUTO_RESPOND_CREDENTIAL_ISSUE)
        {
            let (_, ack) = self.exchange.create_ack(exchange).await?;

            responder.send_reply(Envelope::pack(&ack)?).await?;

            trace_event(
                context.get_settings(),
                &CredentialAck::message_type(),
                "CredentialIssueHandler.handle.ACK",
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

    use caravel_core::identity::verifiable::credential::types::{
        CredentialError, ExchangeEntityAccessor, ThreadID,
    };
    use caravel_core::identity::verifiable::ExchangeState;

    use crate::handler::credential::tests::{
        generate_context, MockFakeExchange, MockFakeResponder,
    };
    use crate::messaging::context::Settings;

    fn generate_issue() -> CredentialIssue {
        CredentialIssue::new(
            ThreadID::generate(),
            json!({"credentialSubject": {"name": "alice"}}),
        )
    }

    #[tokio::test]
    async fn test_handle_without_connection_rejected() {
        let context = generate_context(
            Envelope::pack(&generate_issue()).unwrap(),
            false,
            Settings::new(),
        );

        let handler = CredentialIssueHandler::new(MockFakeExchange::new());
        let handled = handler.handle(&context, &MockFakeResponder::new()).await;

        assert!(matches!(
            handled.unwrap_err(),
            MessagingError::HandlerError(_)
        ));
    }

    #[tokio::test]
    async fn test_handle_auto_respond_acks() {
        let settings = Settings::new().with(SETTING_AUTO_RESPOND_CREDENTIAL_ISSUE, "true");
        let context = generate_context(Envelope::pack(&generate_issue()).unwrap(), true, settings);

        let mut exchange = MockFakeExchange::new();
        exchange
            .expect_receive_credential()
            .times(1)
            .returning(|issue| {
                let mut record = CredentialExchange::new(
                    issue.get_thread_id(),
                    "connection-001".to_string(),
                    ExchangeState::CredentialReceived,
                );
                record.set_issued_credential(issue.get_credential());
                Ok(record)
            });
        exchange.expect_create_ack().times(1).returning(|mut record| {
            record.transition(ExchangeState::CredentialAcked).unwrap();
            let ack = CredentialAck::new(record.get_thread_id());
            Ok((record, ack))
        });

        let mut responder = MockFakeResponder::new();
        responder
            .expect_send_reply()
            .times(1)
            .withf(|envelope| envelope.get_message_type() == CredentialAck::message_type())
            .returning(|_| Ok(()));

        let handler = CredentialIssueHandler::new(exchange);
        let handled = handler.handle(&context, &responder).await;

        assert!(handled.is_ok());
    }

    #[tokio::test]
    async fn test_handle_verification_failure_propagates() {
        let settings = Settings::new().with(SETTING_AUTO_RESPOND_CREDENTIAL_ISSUE, "true");
        let context = generate_context(Envelope::pack(&generate_issue()).unwrap(), true, settings);

        let mut exchange = MockFakeExchange::new();
        exchange
            .expect_receive_credential()
            .times(1)
            .returning(|_| {
                Err(CredentialError::VerifyError(
                    "signature mismatch".to_string(),
                ))
            });

        // a rejected credential must never be acked
        let responder = MockFakeResponder::new();

        let handler = CredentialIssueHandler::new(exchange);
        let handled = handler.handle(&context, &responder).await;

        assert!(matches!(
            handled.unwrap_err(),
            MessagingError::ExchangeError(CredentialError::VerifyError(_))
        ));
    }
}
