use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json;
use rst_common::standard::serde_json::Value;

use prople_did_core::types::{CONTEXT_VC, CONTEXT_VC_V2};
use prople_did_core::verifiable::objects::VC;

use crate::identity::verifiable::proof::purpose::AssertionPurpose;
use crate::identity::verifiable::proof::registry::SuiteRegistry;
use crate::identity::verifiable::proof::types::{DocumentLoader, ProofError};
use crate::identity::verifiable::types::{VerifiableError, CREDENTIAL_TYPE};

use super::exchange::{CredentialExchange, ExchangeState};
use super::messages::{
    CredentialAck, CredentialIssue, CredentialOffer, CredentialProposal, CredentialRequest,
    TypedMessage,
};
use super::types::{CredentialError, ExchangeAPI, ExchangeEntityAccessor, RepoBuilder, UsecaseBuilder};

/// `Usecase` is the base logic implementation of the credential-exchange state
/// machine.
///
/// It depends on the implementations of [`RepoBuilder`] for persistence and
/// [`DocumentLoader`] for resolving key material during proof operations,
/// together with the [`SuiteRegistry`] carrying the registered proof suites.
#[derive(Clone)]
pub struct Usecase<TRepo, TLoader>
where
    TRepo: RepoBuilder<EntityAccessor = CredentialExchange> + Clone + Sync + Send,
    TLoader: DocumentLoader + Clone + Sync + Send,
{
    repo: TRepo,
    loader: TLoader,
    registry: SuiteRegistry,
}

impl<TRepo, TLoader> Usecase<TRepo, TLoader>
where
    TRepo: RepoBuilder<EntityAccessor = CredentialExchange> + Clone + Sync + Send,
    TLoader: DocumentLoader + Clone + Sync + Send,
{
    pub fn new(repo: TRepo, loader: TLoader, registry: SuiteRegistry) -> Self {
        Self {
            repo,
            loader,
            registry,
        }
    }
}

impl<TRepo, TLoader> UsecaseBuilder<CredentialExchange> for Usecase<TRepo, TLoader>
where
    TRepo: RepoBuilder<EntityAccessor = CredentialExchange> + Clone + Sync + Send,
    TLoader: DocumentLoader + Clone + Sync + Send,
{
    type RepoImplementer = TRepo;
    type LoaderImplementer = TLoader;

    fn repo(&self) -> Self::RepoImplementer {
        self.repo.clone()
    }

    fn loader(&self) -> Self::LoaderImplementer {
        self.loader.clone()
    }

    fn registry(&self) -> SuiteRegistry {
        self.registry.clone()
    }
}

#[async_trait]
impl<TRepo, TLoader> ExchangeAPI for Usecase<TRepo, TLoader>
where
    TRepo: RepoBuilder<EntityAccessor = CredentialExchange> + Clone + Sync + Send,
    TLoader: DocumentLoader + Clone + Sync + Send,
{
    type EntityAccessor = CredentialExchange;

    async fn create_proposal(
        &self,
        connection_id: String,
        credential_preview: Value,
    ) -> Result<(CredentialExchange, CredentialProposal), CredentialError> {
        if connection_id.is_empty() {
            return Err(CredentialError::CommonError(
                VerifiableError::ValidationError("connection_id was missing".to_string()),
            ));
        }

        if credential_preview.is_null() {
            return Err(CredentialError::CommonError(
                VerifiableError::ValidationError("credential_preview was missing".to_string()),
            ));
        }

        let proposal = CredentialProposal::new(credential_preview, None);
        let mut exchange = CredentialExchange::new(
            proposal.get_thread_id(),
            connection_id,
            ExchangeState::ProposalSent,
        );
        exchange.set_proposal(proposal.clone());

        self.repo().save_exchange(&exchange).await?;
        Ok((exchange, proposal))
    }

    async fn receive_proposal(
        &self,
        proposal: CredentialProposal,
        connection_id: String,
    ) -> Result<CredentialExchange, CredentialError> {
        if connection_id.is_empty() {
            return Err(CredentialError::CommonError(
                VerifiableError::ValidationError("connection_id was missing".to_string()),
            ));
        }

        let repo = self.repo();
        match repo.get_exchange_by_thread_id(proposal.get_thread_id()).await {
            Ok(existing) => Err(CredentialError::InvalidStateTransition {
                from: existing.get_state(),
                to: ExchangeState::ProposalReceived,
            }),
            Err(CredentialError::ExchangeNotFound(_)) => {
                let mut exchange = CredentialExchange::new(
                    proposal.get_thread_id(),
                    connection_id,
                    ExchangeState::ProposalReceived,
                );
                exchange.set_proposal(proposal);

                repo.save_exchange(&exchange).await?;
                Ok(exchange)
            }
            Err(err) => Err(err),
        }
    }

    async fn create_offer(
        &self,
        exchange: CredentialExchange,
        credential_preview: Value,
    ) -> Result<(CredentialExchange, CredentialOffer), CredentialError> {
        if credential_preview.is_null() {
            return Err(CredentialError::CommonError(
                VerifiableError::ValidationError("credential_preview was missing".to_string()),
            ));
        }

        let mut updated = exchange;
        updated.transition(ExchangeState::OfferSent)?;

        let offer = CredentialOffer::new(Some(updated.get_thread_id()), credential_preview);
        updated.set_offer(offer.clone());

        self.repo().save_exchange(&updated).await?;
        Ok((updated, offer))
    }

    async fn receive_offer(
        &self,
        offer: CredentialOffer,
        connection_id: String,
    ) -> Result<CredentialExchange, CredentialError> {
        let repo = self.repo();
        let exchange = match repo.get_exchange_by_thread_id(offer.get_thread_id()).await {
            Ok(existing) => {
                if existing.get_proposal().is_some() && offer.get_credential_preview().is_null() {
                    return Err(CredentialError::OfferValidationError(
                        "offer does not carry a credential preview for the proposed credential"
                            .to_string(),
                    ));
                }

                let mut updated = existing;
                updated.transition(ExchangeState::OfferReceived)?;
                updated.set_offer(offer);
                updated
            }
            Err(CredentialError::ExchangeNotFound(_)) => {
                if connection_id.is_empty() {
                    return Err(CredentialError::CommonError(
                        VerifiableError::ValidationError("connection_id was missing".to_string()),
                    ));
                }

                let mut created = CredentialExchange::new(
                    offer.get_thread_id(),
                    connection_id,
                    ExchangeState::OfferReceived,
                );
                created.set_offer(offer);
                created
            }
            Err(err) => return Err(err),
        };

        repo.save_exchange(&exchange).await?;
        Ok(exchange)
    }

    async fn create_request(
        &self,
        exchange: CredentialExchange,
        holder_did: String,
    ) -> Result<(CredentialExchange, CredentialRequest), CredentialError> {
        if holder_did.is_empty() {
            return Err(CredentialError::CommonError(
                VerifiableError::ValidationError("holder_did was missing".to_string()),
            ));
        }

        let mut updated = exchange;
        updated.transition(ExchangeState::RequestSent)?;

        let request = CredentialRequest::new(updated.get_thread_id(), holder_did);
        updated.set_request(request.clone());

        self.repo().save_exchange(&updated).await?;
        Ok((updated, request))
    }

    async fn receive_request(
        &self,
        request: CredentialRequest,
    ) -> Result<CredentialExchange, CredentialError> {
        let repo = self.repo();
        let mut updated = repo.get_exchange_by_thread_id(request.get_thread_id()).await?;

        updated.transition(ExchangeState::RequestReceived)?;
        updated.set_request(request);

        repo.save_exchange(&updated).await?;
        Ok(updated)
    }

    async fn issue_credential(
        &self,
        exchange: CredentialExchange,
        did_issuer: String,
        claims: Value,
        signature_type: Option<String>,
    ) -> Result<(CredentialExchange, CredentialIssue), CredentialError> {
        if did_issuer.is_empty() {
            return Err(CredentialError::CommonError(
                VerifiableError::ValidationError("did_issuer was missing".to_string()),
            ));
        }

        let mut updated = exchange;
        let holder_did = updated
            .get_request()
            .map(|request| request.get_holder_did())
            .ok_or_else(|| {
                CredentialError::CommonError(VerifiableError::ValidationError(
                    "exchange has no credential request".to_string(),
                ))
            })?;

        updated.transition(ExchangeState::CredentialIssued)?;

        let mut vc = VC::new(holder_did, did_issuer);
        vc.add_context(CONTEXT_VC.to_string())
            .add_context(CONTEXT_VC_V2.to_string())
            .add_type(CREDENTIAL_TYPE.to_string())
            .set_credential(claims);

        let mut document = serde_json::to_value(vc)
            .map_err(|err| CredentialError::GenerateJSONError(err.to_string()))?;

        if let Some(signature_type) = signature_type {
            let suite = self
                .registry()
                .select(&signature_type)
                .ok_or(ProofError::SuiteNotFound(signature_type))?;

            let loader = self.loader();
            let purpose = AssertionPurpose::new();
            let proof = suite.create_proof(&document, &purpose, &loader).await?;

            let proof_value = serde_json::to_value(proof)
                .map_err(|err| CredentialError::GenerateJSONError(err.to_string()))?;

            if let Some(fields) = document.as_object_mut() {
                fields.insert("proof".to_string(), proof_value);
            }
        }

        updated.set_issued_credential(document.clone());
        let issue = CredentialIssue::new(updated.get_thread_id(), document);

        self.repo().save_exchange(&updated).await?;
        Ok((updated, issue))
    }

    async fn receive_credential(
        &self,
        issue: CredentialIssue,
    ) -> Result<CredentialExchange, CredentialError> {
        let repo = self.repo();
        let mut updated = repo.get_exchange_by_thread_id(issue.get_thread_id()).await?;

        // guard the transition before any proof operation runs
        if !updated
            .get_state()
            .accepts(&ExchangeState::CredentialReceived)
        {
            return Err(CredentialError::InvalidStateTransition {
                from: updated.get_state(),
                to: ExchangeState::CredentialReceived,
            });
        }

        let document = issue.get_credential();

        // an unsigned document is accepted as-is; a signed one must verify
        if document.get("proof").is_some() {
            let loader = self.loader();
            let purpose = AssertionPurpose::new();
            let result = self.registry().verify(&document, &purpose, &loader).await?;

            if !result.verified {
                updated.transition(ExchangeState::Abandoned)?;
                repo.save_exchange(&updated).await?;
                return Err(CredentialError::VerifyError(result.errors.join("; ")));
            }
        }

        updated.transition(ExchangeState::CredentialReceived)?;
        updated.set_issued_credential(document);

        repo.save_exchange(&updated).await?;
        Ok(updated)
    }

    async fn create_ack(
        &self,
        exchange: CredentialExchange,
    ) -> Result<(CredentialExchange, CredentialAck), CredentialError> {
        let mut updated = exchange;
        updated.transition(ExchangeState::CredentialAcked)?;

        let ack = CredentialAck::new(updated.get_thread_id());

        self.repo().save_exchange(&updated).await?;
        Ok((updated, ack))
    }

    async fn receive_ack(&self, ack: CredentialAck) -> Result<CredentialExchange, CredentialError> {
        let repo = self.repo();
        let mut updated = repo.get_exchange_by_thread_id(ack.get_thread_id()).await?;

        updated.transition(ExchangeState::CredentialAcked)?;

        repo.save_exchange(&updated).await?;
        Ok(updated)
    }

    async fn abandon(
        &self,
        exchange: CredentialExchange,
    ) -> Result<CredentialExchange, CredentialError> {
        let mut updated = exchange;
        updated.transition(ExchangeState::Abandoned)?;

        self.repo().save_exchange(&updated).await?;
        Ok(updated)
    }
}
