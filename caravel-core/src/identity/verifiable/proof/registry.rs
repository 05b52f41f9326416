use std::sync::Arc;

use rst_common::standard::serde_json;
use rst_common::standard::serde_json::Value;

use super::purpose::ProofPurpose;
use super::suite::ProofSuite;
use super::types::{DocumentLoader, Proof, ProofError, ProofResult};

/// `SuiteRegistry` holds the registered proof suites in registration order.
///
/// Selection walks the suites in that order and the first suite whose
/// `match_proof` answers true wins. The registry is read-mostly: it is built
/// once, then shared and read concurrently without synchronization.
#[derive(Clone, Default)]
pub struct SuiteRegistry {
    suites: Vec<Arc<dyn ProofSuite>>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, suite: Arc<dyn ProofSuite>) {
        self.suites.push(suite);
    }

    pub fn select(&self, signature_type: &str) -> Option<Arc<dyn ProofSuite>> {
        self.suites
            .iter()
            .find(|suite| suite.match_proof(signature_type))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Verify the proof embedded in `document` against `purpose`.
    ///
    /// The `proof` member is split off the document, parsed, matched to a
    /// registered suite and evaluated over the remaining document. A document
    /// without a `proof` member or with no matching suite cannot be evaluated
    /// and raises; an evaluated-and-failed proof comes back as a soft
    /// [`ProofResult`].
    pub async fn verify(
        &self,
        document: &Value,
        purpose: &dyn ProofPurpose,
        loader: &dyn DocumentLoader,
    ) -> Result<ProofResult, ProofError> {
        let mut unsecured = document.clone();
        let proof_value = match unsecured.as_object_mut() {
            Some(fields) => fields
                .remove("proof")
                .ok_or_else(|| ProofError::DocumentError("document carries no proof".to_string())),
            None => Err(ProofError::DocumentError(
                "document is not an object".to_string(),
            )),
        }?;

        let proof: Proof = serde_json::from_value(proof_value)
            .map_err(|err| ProofError::DocumentError(err.to_string()))?;

        let suite = self
            .select(&proof.proof_type)
            .ok_or_else(|| ProofError::SuiteNotFound(proof.proof_type.clone()))?;

        suite.verify_proof(&proof, &unsecured, purpose, loader).await
    }
}
