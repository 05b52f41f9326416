use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json;
use rst_common::standard::serde_json::Value;

use super::purpose::ProofPurpose;
use super::types::{
    DeriveProofResult, DocumentLoader, LoaderOptions, Proof, ProofError, ProofResult,
    VerificationMethod, VerificationMethodRef,
};

/// `ProofSuite` is the polymorphic capability set implemented by a linked-data
/// signature suite.
///
/// A suite declares an immutable `signature_type` tag and opts into each
/// capability individually: any capability not explicitly overridden fails
/// closed with [`ProofError::CapabilityUnsupported`] naming the suite itself,
/// never a silent no-op. Suite instances hold no per-call mutable state, so
/// one instance may be invoked concurrently from many exchanges without
/// external locking.
#[async_trait]
pub trait ProofSuite: Send + Sync {
    /// The signature-type identifier this suite answers to.
    fn signature_type(&self) -> &str;

    /// Derive-proof transformation tags the suite can act on, when it
    /// supports deriving at all.
    fn supported_derive_proof_types(&self) -> Option<Vec<String>> {
        None
    }

    /// Optional proof payload this instance was configured with; suites bound
    /// to one specific proof expose it here.
    fn proof(&self) -> Option<Proof> {
        None
    }

    /// Create a proof binding a canonical form of `document` under `purpose`,
    /// resolving signing key material through `loader`.
    async fn create_proof(
        &self,
        _document: &Value,
        _purpose: &dyn ProofPurpose,
        _loader: &dyn DocumentLoader,
    ) -> Result<Proof, ProofError> {
        Err(ProofError::CapabilityUnsupported {
            suite: self.signature_type().to_string(),
            capability: "creating proofs".to_string(),
        })
    }

    /// Verify `proof` against `document` and `purpose`, reporting a structured
    /// boolean result with accumulated error descriptions.
    ///
    /// Raises only when the proof cannot be evaluated at all (see
    /// [`ProofSuite::get_verification_method`] raising conditions).
    async fn verify_proof(
        &self,
        _proof: &Proof,
        _document: &Value,
        _purpose: &dyn ProofPurpose,
        _loader: &dyn DocumentLoader,
    ) -> Result<ProofResult, ProofError> {
        Err(ProofError::CapabilityUnsupported {
            suite: self.signature_type().to_string(),
            capability: "verifying proofs".to_string(),
        })
    }

    /// Produce a document restricted to the attributes selected by
    /// `reveal_document`, together with a proof valid over the reduced
    /// document.
    async fn derive_proof(
        &self,
        _proof: &Proof,
        _document: &Value,
        _reveal_document: &Value,
        _loader: &dyn DocumentLoader,
        _nonce: Option<Vec<u8>>,
    ) -> Result<DeriveProofResult, ProofError> {
        Err(ProofError::CapabilityUnsupported {
            suite: self.signature_type().to_string(),
            capability: "deriving proofs".to_string(),
        })
    }

    /// Exact, case-sensitive match of `signature_type` against this suite's
    /// own tag.
    fn match_proof(&self, signature_type: &str) -> bool {
        signature_type == self.signature_type()
    }

    /// Resolve the proof's `verificationMethod` into a fully embedded key
    /// descriptor.
    ///
    /// Raising conditions, each terminal and distinct from a soft verification
    /// failure:
    ///
    /// - the proof carries no `verificationMethod` at all
    /// - the loader cannot resolve the reference to any document
    /// - the resolved descriptor's revocation flag is set; revocation is
    ///   authoritative and no caller may override it
    async fn get_verification_method(
        &self,
        proof: &Proof,
        loader: &dyn DocumentLoader,
    ) -> Result<VerificationMethod, ProofError> {
        let reference = match &proof.verification_method {
            Some(VerificationMethodRef::Embedded(method)) => method.id.clone(),
            Some(VerificationMethodRef::Reference(reference)) => reference.clone(),
            None => String::new(),
        };

        if reference.is_empty() {
            return Err(ProofError::MissingVerificationMethod);
        }

        let options = LoaderOptions::default();
        let resolved = loader
            .load(&reference, &options)
            .await?
            .ok_or_else(|| ProofError::VerificationMethodNotFound(reference.clone()))?;

        let method: VerificationMethod = serde_json::from_value(resolved.document)
            .map_err(|err| ProofError::DocumentError(err.to_string()))?;

        if method.revoked {
            return Err(ProofError::VerificationMethodRevoked(reference));
        }

        Ok(method)
    }
}
