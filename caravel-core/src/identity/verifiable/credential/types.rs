use std::fmt::Debug;

use derive_more::{AsRef, From, Into};
use the_newtype::Newtype;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::standard::uuid::Uuid;
use rst_common::with_errors::thiserror::{self, Error};

use rstdev_domain::entity::ToJSON;

use crate::identity::verifiable::proof::registry::SuiteRegistry;
use crate::identity::verifiable::proof::types::{DocumentLoader, ProofError};
use crate::identity::verifiable::types::{PaginationParams, VerifiableError};

use super::exchange::ExchangeState;
use super::messages::{
    CredentialAck, CredentialIssue, CredentialOffer, CredentialProposal, CredentialRequest,
};

/// `CredentialError` is the base error type for the credential-exchange domain.
#[derive(Debug, PartialEq, Error, Clone)]
pub enum CredentialError {
    #[error("common error: {0}")]
    CommonError(VerifiableError),

    #[error("exchange not found: {0}")]
    ExchangeNotFound(String),

    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: ExchangeState,
        to: ExchangeState,
    },

    #[error("offer validation error: {0}")]
    OfferValidationError(String),

    #[error("credential verification failed: {0}")]
    VerifyError(String),

    #[error("generate json error: {0}")]
    GenerateJSONError(String),

    #[error("unserialize error: {0}")]
    UnserializeError(String),

    #[error(transparent)]
    ProofError(#[from] ProofError),
}

/// Stable correlation identifier spanning every message that belongs to one
/// protocol exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Newtype, From, Into, AsRef)]
#[serde(crate = "self::serde")]
pub struct ThreadID(String);

impl ThreadID {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// `ExchangeEntityAccessor` is a special trait used to access the exchange
/// entity property fields from outside this crate without exposing them to
/// direct manipulation.
pub trait ExchangeEntityAccessor:
    Clone + Debug + ToJSON + TryInto<Vec<u8>> + TryFrom<Vec<u8>>
{
    fn get_id(&self) -> String;
    fn get_thread_id(&self) -> ThreadID;
    fn get_connection_id(&self) -> String;
    fn get_state(&self) -> ExchangeState;
    fn get_proposal(&self) -> Option<CredentialProposal>;
    fn get_offer(&self) -> Option<CredentialOffer>;
    fn get_request(&self) -> Option<CredentialRequest>;
    fn get_issued_credential(&self) -> Option<Value>;
    fn get_created_at(&self) -> DateTime<Utc>;
    fn get_updated_at(&self) -> DateTime<Utc>;
}

/// `RepoBuilder` is the exchange-record repository abstraction implementing the
/// repository pattern.
///
/// The storage implementation behind it must provide atomic read-modify-write
/// per exchange record; two deliveries racing on the same thread must not lose
/// updates. This crate only assumes that property, it never enforces it.
#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    type EntityAccessor: ExchangeEntityAccessor;

    async fn save_exchange(&self, exchange: &Self::EntityAccessor) -> Result<(), CredentialError>;

    async fn get_exchange_by_id(&self, id: String)
        -> Result<Self::EntityAccessor, CredentialError>;

    async fn get_exchange_by_thread_id(
        &self,
        thread_id: ThreadID,
    ) -> Result<Self::EntityAccessor, CredentialError>;

    async fn list_exchanges_by_connection(
        &self,
        connection_id: String,
        pagination: Option<PaginationParams>,
    ) -> Result<Vec<Self::EntityAccessor>, CredentialError>;

    async fn remove_exchange_by_id(&self, id: String) -> Result<(), CredentialError>;
}

/// `ExchangeAPI` is the main entrypoint to the credential-exchange state
/// machine.
///
/// Every operation checks the record's current state before mutating anything
/// (the idempotency guard against redelivered messages) and persists through
/// the repository before returning the updated record; a record passed in by
/// the caller is never observably mutated when persistence fails.
#[async_trait]
pub trait ExchangeAPI: Clone {
    type EntityAccessor: ExchangeEntityAccessor;

    /// Open a new exchange from the holder side by proposing a credential.
    /// The returned record is in `proposal-sent`.
    async fn create_proposal(
        &self,
        connection_id: String,
        credential_preview: Value,
    ) -> Result<(Self::EntityAccessor, CredentialProposal), CredentialError>;

    /// Record a proposal received from a holder. The record is created on the
    /// proposal's thread in `proposal-received`; a thread that already exists
    /// is a state conflict.
    async fn receive_proposal(
        &self,
        proposal: CredentialProposal,
        connection_id: String,
    ) -> Result<Self::EntityAccessor, CredentialError>;

    /// Answer a received proposal with an offer, moving to `offer-sent`.
    async fn create_offer(
        &self,
        exchange: Self::EntityAccessor,
        credential_preview: Value,
    ) -> Result<(Self::EntityAccessor, CredentialOffer), CredentialError>;

    /// Locate or create the exchange keyed by the offer's thread, validate the
    /// offer against any stored proposal, and move to `offer-received`.
    async fn receive_offer(
        &self,
        offer: CredentialOffer,
        connection_id: String,
    ) -> Result<Self::EntityAccessor, CredentialError>;

    /// Build a credential request referencing the holder's identifier and move
    /// to `request-sent`.
    async fn create_request(
        &self,
        exchange: Self::EntityAccessor,
        holder_did: String,
    ) -> Result<(Self::EntityAccessor, CredentialRequest), CredentialError>;

    /// Record a request received on an offered thread, moving to
    /// `request-received`.
    async fn receive_request(
        &self,
        request: CredentialRequest,
    ) -> Result<Self::EntityAccessor, CredentialError>;

    /// Issue the credential for a requested exchange, moving to
    /// `credential-issued`.
    ///
    /// When `signature_type` is given, the matching registered suite attaches
    /// an integrity proof to the credential document; no matching suite is a
    /// terminal error, never a silently unsigned document. `None` issues
    /// without a proof.
    async fn issue_credential(
        &self,
        exchange: Self::EntityAccessor,
        did_issuer: String,
        claims: Value,
        signature_type: Option<String>,
    ) -> Result<(Self::EntityAccessor, CredentialIssue), CredentialError>;

    /// Store a received credential after checking its integrity proof, moving
    /// to `credential-received`. A proof that evaluates to `verified: false`
    /// abandons the exchange.
    async fn receive_credential(
        &self,
        issue: CredentialIssue,
    ) -> Result<Self::EntityAccessor, CredentialError>;

    /// Acknowledge a received credential, moving to `credential-acked`.
    async fn create_ack(
        &self,
        exchange: Self::EntityAccessor,
    ) -> Result<(Self::EntityAccessor, CredentialAck), CredentialError>;

    /// Record the holder's acknowledgement on an issued thread, moving to
    /// `credential-acked`.
    async fn receive_ack(&self, ack: CredentialAck)
        -> Result<Self::EntityAccessor, CredentialError>;

    /// Abandon a non-terminal exchange.
    async fn abandon(
        &self,
        exchange: Self::EntityAccessor,
    ) -> Result<Self::EntityAccessor, CredentialError>;
}

/// `UsecaseBuilder` is a trait behavior that provides the base application
/// logic's dependencies.
pub trait UsecaseBuilder<TEntityAccessor>: ExchangeAPI<EntityAccessor = TEntityAccessor>
where
    TEntityAccessor: ExchangeEntityAccessor,
{
    type RepoImplementer: RepoBuilder<EntityAccessor = TEntityAccessor>;
    type LoaderImplementer: DocumentLoader;

    fn repo(&self) -> Self::RepoImplementer;
    fn loader(&self) -> Self::LoaderImplementer;
    fn registry(&self) -> SuiteRegistry;
}
