//! `caravel-core` holds the core protocol logic of the `Caravel` agent, an
//! engine for decentralized-identity protocols built on the `DID Framework`.
//!
//! The crate is the domain layer only. Wire transport, persistent storage,
//! key management and DID resolution are all external collaborators reached
//! through the trait seams defined here (`RepoBuilder`, `DocumentLoader`,
//! and the responder abstraction living in `caravel-agent`).
pub mod identity;
