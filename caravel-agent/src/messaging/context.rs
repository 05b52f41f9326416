use std::collections::HashMap;

use multiaddr::Multiaddr;

use super::envelope::Envelope;

pub const SETTING_TRACE_LABEL: &str = "trace.label";
pub const SETTING_AUTO_RESPOND_CREDENTIAL_OFFER: &str = "auto_respond.credential_offer";
pub const SETTING_AUTO_RESPOND_CREDENTIAL_REQUEST: &str = "auto_respond.credential_request";
pub const SETTING_AUTO_RESPOND_CREDENTIAL_ISSUE: &str = "auto_respond.credential_issue";
pub const SETTING_ISSUE_SIGNATURE_TYPE: &str = "issue.signature_type";

/// `Settings` is the flat string-keyed configuration mapping threaded
/// explicitly through every call boundary. It is immutable once built;
/// unrecognized keys are simply ignored by every consumer.
#[derive(Debug, Clone, Default)]
pub struct Settings(HashMap<String, String>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|value| value.as_str())
    }

    /// Read a boolean flag; an absent key is `false`.
    pub fn get_flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("true") | Some("1") | Some("yes"))
    }
}

/// `ConnectionRecord` carries the identity facts of the secure channel the
/// inbound message arrived on: our own DID, the peer's DID, and the peer
/// agent's transport address when one is known.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    id: String,
    own_did: String,
    peer_did: String,
    peer_addr: Option<Multiaddr>,
}

impl ConnectionRecord {
    pub fn new(id: String, own_did: String, peer_did: String, peer_addr: Option<Multiaddr>) -> Self {
        Self {
            id,
            own_did,
            peer_did,
            peer_addr,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.to_owned()
    }

    pub fn get_own_did(&self) -> String {
        self.own_did.to_owned()
    }

    pub fn get_peer_did(&self) -> String {
        self.peer_did.to_owned()
    }

    pub fn get_peer_addr(&self) -> Option<Multiaddr> {
        self.peer_addr.to_owned()
    }
}

/// `RequestContext` is the immutable per-message bundle handed to a handler:
/// the inbound envelope, the connection metadata, and the configuration
/// mapping. It is created once per inbound message and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RequestContext {
    envelope: Envelope,
    connection_ready: bool,
    connection: Option<ConnectionRecord>,
    settings: Settings,
}

impl RequestContext {
    pub fn new(envelope: Envelope, settings: Settings) -> Self {
        Self {
            envelope,
            connection_ready: false,
            connection: None,
            settings,
        }
    }

    /// Attach the connection the message arrived on. `ready` reflects whether
    /// the secure channel is established; a context without a ready
    /// connection must be rejected by every handler before any state
    /// mutation.
    pub fn with_connection(mut self, connection: ConnectionRecord, ready: bool) -> Self {
        self.connection = Some(connection);
        self.connection_ready = ready;
        self
    }

    pub fn get_message(&self) -> &Envelope {
        &self.envelope
    }

    pub fn connection_ready(&self) -> bool {
        self.connection_ready
    }

    pub fn get_connection(&self) -> Option<&ConnectionRecord> {
        self.connection.as_ref()
    }

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::serde_json::json;

    use caravel_core::identity::verifiable::credential::messages::CredentialOffer;

    fn generate_envelope() -> Envelope {
        let offer = CredentialOffer::new(None, json!({"name": "alice"}));
        Envelope::pack(&offer).unwrap()
    }

    #[test]
    fn test_settings_flags() {
        let settings = Settings::new()
            .with(SETTING_AUTO_RESPOND_CREDENTIAL_OFFER, "true")
            .with(SETTING_AUTO_RESPOND_CREDENTIAL_REQUEST, "0")
            .with(SETTING_TRACE_LABEL, "caravel.test");

        assert!(settings.get_flag(SETTING_AUTO_RESPOND_CREDENTIAL_OFFER));
        assert!(!settings.get_flag(SETTING_AUTO_RESPOND_CREDENTIAL_REQUEST));
        assert!(!settings.get_flag(SETTING_AUTO_RESPOND_CREDENTIAL_ISSUE));
        assert_eq!(settings.get(SETTING_TRACE_LABEL), Some("caravel.test"));
        assert_eq!(settings.get("unrecognized.key"), None);
    }

    #[test]
    fn test_context_defaults_not_ready() {
        let context = RequestContext::new(generate_envelope(), Settings::new());
        assert!(!context.connection_ready());
        assert!(context.get_connection().is_none());
    }

    #[test]
    fn test_context_with_connection() {
        let record = ConnectionRecord::new(
            "connection-001".to_string(),
            "did:example:holder".to_string(),
            "did:example:issuer".to_string(),
            None,
        );

        let context =
            RequestContext::new(generate_envelope(), Settings::new()).with_connection(record, true);

        assert!(context.connection_ready());
        assert_eq!(
            context.get_connection().unwrap().get_own_did(),
            "did:example:holder"
        );
    }
}
