mod exchange;
pub use exchange::{CredentialExchange, ExchangeState};

mod usecase;
pub use usecase::Usecase;

pub mod messages;
pub mod types;
