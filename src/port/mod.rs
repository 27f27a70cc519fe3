//! Ports: trait seams between the application core and the outside world.

pub mod outbound;

pub use outbound::{Credentials, ExchangeConnector, ExchangeId};
