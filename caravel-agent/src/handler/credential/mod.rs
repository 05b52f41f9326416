mod offer;
pub use offer::CredentialOfferHandler;

mod request;
pub use request::CredentialRequestHandler;

mod issue;
pub use issue::CredentialIssueHandler;

mod ack;
pub use ack::CredentialAckHandler;

#[cfg(test)]
pub(crate) mod tests {
    use mockall::mock;

    use rst_common::standard::async_trait::async_trait;
    use rst_common::standard::serde_json::Value;

    use caravel_core::identity::verifiable::credential::messages::{
        CredentialAck, CredentialIssue, CredentialOffer, CredentialProposal, CredentialRequest,
    };
    use caravel_core::identity::verifiable::credential::types::{CredentialError, ExchangeAPI};
    use caravel_core::identity::verifiable::CredentialExchange;

    use crate::messaging::context::{ConnectionRecord, RequestContext, Settings};
    use crate::messaging::envelope::Envelope;
    use crate::messaging::types::{MessagingError, Responder};

    mock!(
        pub FakeExchange{}

        impl Clone for FakeExchange {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl ExchangeAPI for FakeExchange {
            type EntityAccessor = CredentialExchange;

            async fn create_proposal(
                &self,
                connection_id: String,
                credential_preview: Value,
            ) -> Result<(CredentialExchange, CredentialProposal), CredentialError>;

            async fn receive_proposal(
                &self,
                proposal: CredentialProposal,
                connection_id: String,
            ) -> Result<CredentialExchange, CredentialError>;

            async fn create_offer(
                &self,
                exchange: CredentialExchange,
                credential_preview: Value,
            ) -> Result<(CredentialExchange, CredentialOffer), CredentialError>;

            async fn receive_offer(
                &self,
                offer: CredentialOffer,
                connection_id: String,
            ) -> Result<CredentialExchange, CredentialError>;

            async fn create_request(
                &self,
                exchange: CredentialExchange,
                holder_did: String,
            ) -> Result<(CredentialExchange, CredentialRequest), CredentialError>;

            async fn receive_request(
                &self,
                request: CredentialRequest,
            ) -> Result<CredentialExchange, CredentialError>;

            async fn issue_credential(
                &self,
                exchange: CredentialExchange,
                did_issuer: String,
                claims: Value,
                signature_type: Option<String>,
            ) -> Result<(CredentialExchange, CredentialIssue), CredentialError>;

            async fn receive_credential(
                &self,
                issue: CredentialIssue,
            ) -> Result<CredentialExchange, CredentialError>;

            async fn create_ack(
                &self,
                exchange: CredentialExchange,
            ) -> Result<(CredentialExchange, CredentialAck), CredentialError>;

            async fn receive_ack(
                &self,
                ack: CredentialAck,
            ) -> Result<CredentialExchange, CredentialError>;

            async fn abandon(
                &self,
                exchange: CredentialExchange,
            ) -> Result<CredentialExchange, CredentialError>;
        }
    );

    mock!(
        pub FakeResponder{}

        #[async_trait]
        impl Responder for FakeResponder {
            async fn send_reply(&self, envelope: Envelope) -> Result<(), MessagingError>;
        }
    );

    pub(crate) fn generate_connection() -> ConnectionRecord {
        ConnectionRecord::new(
            "connection-001".to_string(),
            "did:example:own".to_string(),
            "did:example:peer".to_string(),
            None,
        )
    }

    pub(crate) fn generate_context(
        envelope: Envelope,
        ready: bool,
        settings: Settings,
    ) -> RequestContext {
        RequestContext::new(envelope, settings).with_connection(generate_connection(), ready)
    }
}
