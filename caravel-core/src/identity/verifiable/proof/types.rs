use rst_common::standard::async_trait::async_trait;
use rst_common::standard::chrono::Utc;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{Map, Value};
use rst_common::with_errors::thiserror::{self, Error};

/// Fixed expansion context used when dereferencing verification methods.
pub const SECURITY_CONTEXT_URL: &str = "https://w3id.org/security/v2";

/// Embed directive forcing the loader to return the full node, never a bare
/// reference.
pub const EMBED_ALWAYS: &str = "@always";

/// `ProofError` is the base error type for the `proof` domain.
///
/// Every variant here is a *terminal* condition for the proof operation that
/// raised it: the proof could not be evaluated at all. A proof that was
/// evaluated and found invalid is reported through [`ProofResult`] instead.
#[derive(Debug, PartialEq, Error, Serialize, Deserialize, Clone)]
#[serde(crate = "self::serde")]
pub enum ProofError {
    #[error("{suite} signature suite does not support {capability}")]
    CapabilityUnsupported { suite: String, capability: String },

    #[error("no verificationMethod found in proof")]
    MissingVerificationMethod,

    #[error("verification method {0} not found")]
    VerificationMethodNotFound(String),

    #[error("verification method {0} has been revoked")]
    VerificationMethodRevoked(String),

    #[error("no registered suite matches signature type: {0}")]
    SuiteNotFound(String),

    #[error("document error: {0}")]
    DocumentError(String),

    #[error("loader error: {0}")]
    LoaderError(String),
}

/// `VerificationMethod` is a fully dereferenced key descriptor document.
///
/// It is resolved per verification attempt and never cached by this crate;
/// caching, if any, belongs to the document-loader collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,

    #[serde(default)]
    pub revoked: bool,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// A proof's signing-key reference: either an inline descriptor or a bare
/// identifier string. Both forms are resolved through the document loader
/// before use; the inline form only contributes its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde", untagged)]
pub enum VerificationMethodRef {
    Embedded(VerificationMethod),
    Reference(String),
}

impl VerificationMethodRef {
    pub fn id(&self) -> &str {
        match self {
            VerificationMethodRef::Embedded(method) => &method.id,
            VerificationMethodRef::Reference(reference) => reference,
        }
    }
}

/// `Proof` is the linked-data integrity proof attached to exchanged documents.
///
/// The bit-exact layout of `proof_value` is delegated to concrete suites; this
/// crate only constrains the presence and resolution contract of
/// `verification_method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(rename = "verificationMethod")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<VerificationMethodRef>,

    #[serde(rename = "proofPurpose")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,

    #[serde(rename = "proofValue")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl Proof {
    pub fn new(proof_type: &str) -> Self {
        Self {
            proof_type: proof_type.to_string(),
            created: Some(Utc::now().to_rfc3339()),
            verification_method: None,
            proof_purpose: None,
            proof_value: None,
            nonce: None,
        }
    }

    pub fn with_verification_method(mut self, reference: &str) -> Self {
        self.verification_method = Some(VerificationMethodRef::Reference(reference.to_string()));
        self
    }

    pub fn with_purpose(mut self, purpose: &str) -> Self {
        self.proof_purpose = Some(purpose.to_string());
        self
    }

    pub fn with_proof_value(mut self, value: &str) -> Self {
        self.proof_value = Some(value.to_string());
        self
    }

    pub fn with_nonce(mut self, nonce: &str) -> Self {
        self.nonce = Some(nonce.to_string());
        self
    }
}

/// Outcome of evaluating a proof against a document and purpose.
///
/// A `verified: false` result carries the accumulated error descriptions so
/// callers can inspect *why* a proof failed without treating the failure as
/// exceptional control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ProofResult {
    pub verified: bool,
    pub errors: Vec<String>,
}

impl ProofResult {
    pub fn ok() -> Self {
        Self {
            verified: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            verified: false,
            errors,
        }
    }
}

/// Result of deriving a selective-disclosure proof: the reduced document
/// together with a proof valid over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct DeriveProofResult {
    pub document: Value,
    pub proof: Proof,
}

/// A document resolved by the loader collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct RemoteDocument {
    pub document: Value,

    #[serde(rename = "documentUrl")]
    pub document_url: String,

    #[serde(rename = "contextUrl")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_url: Option<String>,
}

/// Options passed to the loader on every resolution attempt. The expansion
/// context is fixed to the security context and embedding is always forced.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    pub expand_context: String,
    pub embed: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            expand_context: SECURITY_CONTEXT_URL.to_string(),
            embed: EMBED_ALWAYS.to_string(),
        }
    }
}

/// `DocumentLoader` resolves an identifier/reference to its full document
/// representation.
///
/// `Ok(None)` means the reference could not be resolved to any document, which
/// callers must keep distinguishable from "resolved but revoked" (the latter is
/// detected on the returned descriptor, not by the loader).
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(
        &self,
        reference: &str,
        options: &LoaderOptions,
    ) -> Result<Option<RemoteDocument>, ProofError>;
}
