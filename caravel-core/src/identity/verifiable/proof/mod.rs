//! `proof` module provides the pluggable linked-data-proof suite framework.
//!
//! A *suite* is a polymorphic capability set over `create_proof`, `verify_proof`,
//! `derive_proof` and `match_proof`. Concrete suites are registered on a
//! [`registry::SuiteRegistry`] under their `signature_type` identifier and are
//! selected at runtime by exact tag matching. Every capability a suite does not
//! explicitly implement fails closed with an error naming the suite, so new
//! suites opt into each capability individually.
//!
//! Resolving a proof's signing-key reference into a fully embedded key
//! descriptor happens through an injected [`types::DocumentLoader`]; the
//! concrete loader (and any caching) belongs to the DID-resolution collaborator
//! outside this crate.
pub mod purpose;
pub mod registry;
pub mod suite;
pub mod types;
