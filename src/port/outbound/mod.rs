//! Outbound ports: contracts the application drives external services through.

pub mod connector;

pub use connector::{Credentials, ExchangeConnector, ExchangeId};
