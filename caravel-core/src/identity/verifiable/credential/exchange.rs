use std::fmt;

use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::serde_json::Value;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::messages::{CredentialOffer, CredentialProposal, CredentialRequest};
use super::types::{CredentialError, ExchangeEntityAccessor, ThreadID};

/// `ExchangeState` represents one station on the credential-issuance protocol
/// between two peers.
///
/// State only moves along the allowed transition graph:
///
/// ```text
/// proposal-sent ----> offer-received ----> request-sent ----> credential-received ----> credential-acked
/// proposal-received -> offer-sent -------> request-received -> credential-issued -----> credential-acked
/// ```
///
/// with `abandoned` reachable from any non-terminal state. Anything else is
/// rejected, which is also what makes redelivered messages harmless: a
/// transition that was already applied cannot be applied twice.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
#[serde(rename_all = "kebab-case")]
pub enum ExchangeState {
    ProposalSent,
    ProposalReceived,
    OfferSent,
    OfferReceived,
    RequestSent,
    RequestReceived,
    CredentialIssued,
    CredentialReceived,
    CredentialAcked,
    Abandoned,
}

impl ExchangeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExchangeState::CredentialAcked | ExchangeState::Abandoned
        )
    }

    pub fn accepts(&self, next: &ExchangeState) -> bool {
        if *next == ExchangeState::Abandoned {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (ExchangeState::ProposalSent, ExchangeState::OfferReceived)
                | (ExchangeState::ProposalReceived, ExchangeState::OfferSent)
                | (ExchangeState::OfferSent, ExchangeState::RequestReceived)
                | (ExchangeState::OfferReceived, ExchangeState::RequestSent)
                | (ExchangeState::RequestSent, ExchangeState::CredentialReceived)
                | (ExchangeState::RequestReceived, ExchangeState::CredentialIssued)
                | (ExchangeState::CredentialIssued, ExchangeState::CredentialAcked)
                | (ExchangeState::CredentialReceived, ExchangeState::CredentialAcked)
        )
    }
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            ExchangeState::ProposalSent => "proposal-sent",
            ExchangeState::ProposalReceived => "proposal-received",
            ExchangeState::OfferSent => "offer-sent",
            ExchangeState::OfferReceived => "offer-received",
            ExchangeState::RequestSent => "request-sent",
            ExchangeState::RequestReceived => "request-received",
            ExchangeState::CredentialIssued => "credential-issued",
            ExchangeState::CredentialReceived => "credential-received",
            ExchangeState::CredentialAcked => "credential-acked",
            ExchangeState::Abandoned => "abandoned",
        };

        write!(f, "{}", state)
    }
}

/// `CredentialExchange` is the persistent aggregate tracking one
/// credential-issuance protocol instance across multiple messages.
///
/// It is created on the first protocol message of an exchange, mutated
/// exclusively by the exchange state-machine operations, and keyed for
/// correlation by its `thread_id`, which stays stable for the lifetime of the
/// exchange.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(crate = "self::serde")]
pub struct CredentialExchange {
    pub(crate) id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: ThreadID,

    #[serde(rename = "connectionId")]
    pub(crate) connection_id: String,

    pub(crate) state: ExchangeState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) proposal: Option<CredentialProposal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) offer: Option<CredentialOffer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) request: Option<CredentialRequest>,

    #[serde(rename = "issuedCredential")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) issued_credential: Option<Value>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "createdAt")]
    pub(crate) created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "updatedAt")]
    pub(crate) updated_at: DateTime<Utc>,
}

impl CredentialExchange {
    pub fn new(thread_id: ThreadID, connection_id: String, state: ExchangeState) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id,
            connection_id,
            state,
            proposal: None,
            offer: None,
            request: None,
            issued_credential: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Move the exchange to `next`, refusing anything outside the allowed
    /// transition graph.
    pub fn transition(&mut self, next: ExchangeState) -> Result<&mut Self, CredentialError> {
        if !self.state.accepts(&next) {
            return Err(CredentialError::InvalidStateTransition {
                from: self.state.clone(),
                to: next,
            });
        }

        self.state = next;
        self.updated_at = Utc::now();
        Ok(self)
    }

    pub fn set_proposal(&mut self, proposal: CredentialProposal) -> &mut Self {
        self.proposal = Some(proposal);
        self.updated_at = Utc::now();
        self
    }

    pub fn set_offer(&mut self, offer: CredentialOffer) -> &mut Self {
        self.offer = Some(offer);
        self.updated_at = Utc::now();
        self
    }

    pub fn set_request(&mut self, request: CredentialRequest) -> &mut Self {
        self.request = Some(request);
        self.updated_at = Utc::now();
        self
    }

    pub fn set_issued_credential(&mut self, credential: Value) -> &mut Self {
        self.issued_credential = Some(credential);
        self.updated_at = Utc::now();
        self
    }
}

impl ToJSON for CredentialExchange {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for CredentialExchange {
    type Error = CredentialError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| CredentialError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for CredentialExchange {
    type Error = CredentialError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let exchange: CredentialExchange = serde_json::from_slice(&value)
            .map_err(|err| CredentialError::UnserializeError(err.to_string()))?;
        Ok(exchange)
    }
}

impl ExchangeEntityAccessor for CredentialExchange {
    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_thread_id(&self) -> ThreadID {
        self.thread_id.to_owned()
    }

    fn get_connection_id(&self) -> String {
        self.connection_id.to_owned()
    }

    fn get_state(&self) -> ExchangeState {
        self.state.to_owned()
    }

    fn get_proposal(&self) -> Option<CredentialProposal> {
        self.proposal.to_owned()
    }

    fn get_offer(&self) -> Option<CredentialOffer> {
        self.offer.to_owned()
    }

    fn get_request(&self) -> Option<CredentialRequest> {
        self.request.to_owned()
    }

    fn get_issued_credential(&self) -> Option<Value> {
        self.issued_credential.to_owned()
    }

    fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at.to_owned()
    }

    fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at.to_owned()
    }
}
