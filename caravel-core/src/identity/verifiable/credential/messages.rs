use std::fmt;
use std::str::FromStr;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::standard::uuid::Uuid;

use crate::identity::verifiable::types::VerifiableError;

use super::types::ThreadID;

pub const PROTOCOL_FAMILY: &str = "issue-credential";
pub const PROTOCOL_VERSION: &str = "1.0";

pub const MSG_NAME_PROPOSE_CREDENTIAL: &str = "propose-credential";
pub const MSG_NAME_OFFER_CREDENTIAL: &str = "offer-credential";
pub const MSG_NAME_REQUEST_CREDENTIAL: &str = "request-credential";
pub const MSG_NAME_ISSUE_CREDENTIAL: &str = "issue-credential";
pub const MSG_NAME_ACK: &str = "ack";

/// `MessageType` is the protocol-family/version/name tag identifying a typed
/// message envelope. Its string form, `family/version/name`, is the dispatch
/// key used to resolve the matching handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct MessageType {
    family: String,
    version: String,
    name: String,
}

impl MessageType {
    pub fn new(family: &str, version: &str, name: &str) -> Self {
        Self {
            family: family.to_string(),
            version: version.to_string(),
            name: name.to_string(),
        }
    }

    pub fn get_family(&self) -> &str {
        &self.family
    }

    pub fn get_version(&self) -> &str {
        &self.version
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.family, self.version, self.name)
    }
}

impl FromStr for MessageType {
    type Err = VerifiableError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let mut parts = tag.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(family), Some(version), Some(name), None)
                if !family.is_empty() && !version.is_empty() && !name.is_empty() =>
            {
                Ok(Self::new(family, version, name))
            }
            _ => Err(VerifiableError::MessageTypeError(format!(
                "malformed message type tag: {}",
                tag
            ))),
        }
    }
}

/// `TypedMessage` is implemented by every protocol message so the dispatch
/// layer can pack it into (and open it from) a typed envelope.
pub trait TypedMessage {
    fn message_type() -> MessageType
    where
        Self: Sized;

    fn get_id(&self) -> String;
    fn get_thread_id(&self) -> ThreadID;
}

/// Holder-side opening move: proposes a credential to an issuer. The
/// proposal's own id opens the thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct CredentialProposal {
    pub(crate) id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: ThreadID,

    #[serde(rename = "credentialPreview")]
    pub(crate) credential_preview: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
}

impl CredentialProposal {
    pub fn new(credential_preview: Value, comment: Option<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            thread_id: ThreadID::from(id.clone()),
            id,
            credential_preview,
            comment,
        }
    }

    pub fn get_credential_preview(&self) -> Value {
        self.credential_preview.to_owned()
    }
}

impl TypedMessage for CredentialProposal {
    fn message_type() -> MessageType {
        MessageType::new(
            PROTOCOL_FAMILY,
            PROTOCOL_VERSION,
            MSG_NAME_PROPOSE_CREDENTIAL,
        )
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_thread_id(&self) -> ThreadID {
        self.thread_id.to_owned()
    }
}

/// Issuer-side offer of a credential. An offer may answer a proposal on an
/// existing thread or open a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct CredentialOffer {
    pub(crate) id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: ThreadID,

    #[serde(rename = "credentialPreview")]
    pub(crate) credential_preview: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
}

impl CredentialOffer {
    pub fn new(thread_id: Option<ThreadID>, credential_preview: Value) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            thread_id: thread_id.unwrap_or_else(|| ThreadID::from(id.clone())),
            id,
            credential_preview,
            comment: None,
        }
    }

    pub fn get_credential_preview(&self) -> Value {
        self.credential_preview.to_owned()
    }
}

impl TypedMessage for CredentialOffer {
    fn message_type() -> MessageType {
        MessageType::new(PROTOCOL_FAMILY, PROTOCOL_VERSION, MSG_NAME_OFFER_CREDENTIAL)
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_thread_id(&self) -> ThreadID {
        self.thread_id.to_owned()
    }
}

/// Holder-side request for the offered credential, referencing the holder's
/// own identifier as the credential subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct CredentialRequest {
    pub(crate) id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: ThreadID,

    #[serde(rename = "holderDid")]
    pub(crate) holder_did: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
}

impl CredentialRequest {
    pub fn new(thread_id: ThreadID, holder_did: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id,
            holder_did,
            comment: None,
        }
    }

    pub fn get_holder_did(&self) -> String {
        self.holder_did.to_owned()
    }
}

impl TypedMessage for CredentialRequest {
    fn message_type() -> MessageType {
        MessageType::new(
            PROTOCOL_FAMILY,
            PROTOCOL_VERSION,
            MSG_NAME_REQUEST_CREDENTIAL,
        )
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_thread_id(&self) -> ThreadID {
        self.thread_id.to_owned()
    }
}

/// Issuer-side delivery of the issued credential document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct CredentialIssue {
    pub(crate) id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: ThreadID,

    pub(crate) credential: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
}

impl CredentialIssue {
    pub fn new(thread_id: ThreadID, credential: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id,
            credential,
            comment: None,
        }
    }

    pub fn get_credential(&self) -> Value {
        self.credential.to_owned()
    }
}

impl TypedMessage for CredentialIssue {
    fn message_type() -> MessageType {
        MessageType::new(PROTOCOL_FAMILY, PROTOCOL_VERSION, MSG_NAME_ISSUE_CREDENTIAL)
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_thread_id(&self) -> ThreadID {
        self.thread_id.to_owned()
    }
}

/// Closing acknowledgement from the holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct CredentialAck {
    pub(crate) id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: ThreadID,

    pub(crate) status: String,
}

impl CredentialAck {
    pub fn new(thread_id: ThreadID) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id,
            status: "OK".to_string(),
        }
    }

    pub fn get_status(&self) -> String {
        self.status.to_owned()
    }
}

impl TypedMessage for CredentialAck {
    fn message_type() -> MessageType {
        MessageType::new(PROTOCOL_FAMILY, PROTOCOL_VERSION, MSG_NAME_ACK)
    }

    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_thread_id(&self) -> ThreadID {
        self.thread_id.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::serde_json::json;
    use table_test::table_test;

    #[test]
    fn test_message_type_parse() {
        let table = vec![
            (
                "issue-credential/1.0/offer-credential",
                Some(CredentialOffer::message_type()),
            ),
            (
                "issue-credential/1.0/request-credential",
                Some(CredentialRequest::message_type()),
            ),
            ("issue-credential/1.0", None),
            ("issue-credential/1.0/offer-credential/extra", None),
            ("issue-credential//offer-credential", None),
            ("", None),
        ];

        for (validator, input, expected) in table_test!(table) {
            let parsed = MessageType::from_str(input).ok();

            validator
                .given(input)
                .when("parsing the tag")
                .then("it matches the expected message type")
                .assert_eq(expected, parsed);
        }
    }

    #[test]
    fn test_message_type_roundtrip() {
        let original = CredentialIssue::message_type();
        let parsed = MessageType::from_str(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_offer_thread_defaults_to_id() {
        let offer = CredentialOffer::new(None, json!({"name": "alice"}));
        assert_eq!(offer.get_thread_id(), ThreadID::from(offer.get_id()));
    }

    #[test]
    fn test_offer_keeps_given_thread() {
        let thread_id = ThreadID::generate();
        let offer = CredentialOffer::new(Some(thread_id.clone()), json!({"name": "alice"}));
        assert_eq!(offer.get_thread_id(), thread_id);
        assert_ne!(offer.get_thread_id(), ThreadID::from(offer.get_id()));
    }

    #[test]
    fn test_proposal_opens_thread() {
        let proposal = CredentialProposal::new(json!({"name": "alice"}), None);
        assert_eq!(proposal.get_thread_id(), ThreadID::from(proposal.get_id()));
    }
}
