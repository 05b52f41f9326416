pub mod proof;
pub mod types;

pub mod credential;
pub use credential::{CredentialExchange, ExchangeState};
