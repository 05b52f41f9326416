use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::serde_json::Value;

use caravel_core::identity::verifiable::credential::messages::{MessageType, TypedMessage};

use super::types::MessagingError;

/// `Envelope` is the typed envelope wrapping one inbound or outbound protocol
/// message: the protocol-family/version/name tag used as the dispatch key,
/// plus the message body. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Envelope {
    #[serde(rename = "messageType")]
    message_type: MessageType,

    body: Value,
}

impl Envelope {
    pub fn pack<TMessage>(message: &TMessage) -> Result<Self, MessagingError>
    where
        TMessage: TypedMessage + Serialize,
    {
        let body = serde_json::to_value(message)
            .map_err(|err| MessagingError::MessageMismatch(err.to_string()))?;

        Ok(Self {
            message_type: TMessage::message_type(),
            body,
        })
    }

    /// Open the envelope as the concrete message type `TMessage`.
    ///
    /// A handler opening an envelope whose tag does not match its expected
    /// type is a programming-level fault in the registry wiring, surfaced as
    /// [`MessagingError::MessageMismatch`].
    pub fn open<TMessage>(&self) -> Result<TMessage, MessagingError>
    where
        TMessage: TypedMessage + DeserializeOwned,
    {
        let expected = TMessage::message_type();
        if self.message_type != expected {
            return Err(MessagingError::MessageMismatch(format!(
                "expected message type {} got {}",
                expected, self.message_type
            )));
        }

        serde_json::from_value(self.body.clone())
            .map_err(|err| MessagingError::MessageMismatch(err.to_string()))
    }

    pub fn get_message_type(&self) -> MessageType {
        self.message_type.to_owned()
    }

    pub fn get_body(&self) -> Value {
        self.body.to_owned()
    }
}
