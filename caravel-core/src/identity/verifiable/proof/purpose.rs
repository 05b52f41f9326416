use super::types::{Proof, ProofResult, VerificationMethod};

/// `ProofPurpose` is the authorization context under which a proof is created
/// or must be accepted.
///
/// Purposes and suites reference each other only through their abstract
/// capability signatures, never through concrete types, so either side can be
/// implemented and injected independently. A purpose is owned by the caller,
/// passed by reference into proof operations, and never mutated by them.
pub trait ProofPurpose: Send + Sync {
    /// The purpose term recorded in a proof's `proofPurpose` field.
    fn term(&self) -> &str;

    /// Evaluate the proof's declared purpose against this one.
    ///
    /// A mismatch is an *evaluated and failed* outcome, reported through
    /// [`ProofResult`]; it is never raised.
    fn validate(&self, proof: &Proof, _method: &VerificationMethod) -> ProofResult {
        match proof.proof_purpose.as_deref() {
            Some(declared) if declared == self.term() => ProofResult::ok(),
            Some(declared) => ProofResult::failed(vec![format!(
                "proof purpose {} does not match expected {}",
                declared,
                self.term()
            )]),
            None => ProofResult::failed(vec!["proof carries no proofPurpose".to_string()]),
        }
    }
}

/// Purpose accepted on credential assertions.
#[derive(Debug, Clone, Default)]
pub struct AssertionPurpose;

impl AssertionPurpose {
    pub fn new() -> Self {
        Self
    }
}

impl ProofPurpose for AssertionPurpose {
    fn term(&self) -> &str {
        "assertionMethod"
    }
}

/// Purpose accepted on authentication challenges.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationPurpose;

impl AuthenticationPurpose {
    pub fn new() -> Self {
        Self
    }
}

impl ProofPurpose for AuthenticationPurpose {
    fn term(&self) -> &str {
        "authentication"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rst_common::standard::serde_json::Map;

    fn generate_method() -> VerificationMethod {
        VerificationMethod {
            id: "did:example:issuer#key-1".to_string(),
            method_type: Some("Ed25519VerificationKey2018".to_string()),
            controller: Some("did:example:issuer".to_string()),
            revoked: false,
            properties: Map::new(),
        }
    }

    #[test]
    fn test_validate_matching_term() {
        let purpose = AssertionPurpose::new();
        let proof = Proof::new("Ed25519Signature2018").with_purpose("assertionMethod");

        let result = purpose.validate(&proof, &generate_method());
        assert!(result.verified);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_mismatched_term() {
        let purpose = AuthenticationPurpose::new();
        let proof = Proof::new("Ed25519Signature2018").with_purpose("assertionMethod");

        let result = purpose.validate(&proof, &generate_method());
        assert!(!result.verified);
        assert!(result.errors[0].contains("authentication"));
    }

    #[test]
    fn test_validate_missing_term() {
        let purpose = AssertionPurpose::new();
        let proof = Proof::new("Ed25519Signature2018");

        let result = purpose.validate(&proof, &generate_method());
        assert!(!result.verified);
    }
}
