//! `identity` is a sub-domain used to manage identity following the framework of
//! `SSI (Self Sovereign Identity)` based on `DID Framework`
//!
//! The current crate covers a single sub-domain:
//!
//! - `verifiable`
//!
//! ---
//!
//! The `verifiable` sub-domain maintains the credential-issuance protocol between
//! two agents: the exchange record and its state machine, the protocol messages
//! belonging to the `issue-credential` family, and the linked-data-proof suite
//! framework used to attach and check integrity proofs on the exchanged
//! credential documents.
//!
//! There are three roles involved on this domain:
//!
//! - The **Issuer**, is an entity who generates the credential.
//! - The **Holder**, is an entity who requests and holds the credential.
//! - The **Verifier**, is an entity which needs to prove a given credential,
//!   possibly revealing only a subset of its attributes through a derived proof.
//!
//! Credential documents themselves are managed through the library
//! `prople-did-core`; this crate carries only the protocol logic around them.
pub mod verifiable;
