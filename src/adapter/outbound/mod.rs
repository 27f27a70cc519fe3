//! Exchange connector implementations.
//!
//! One module per exchange, each implementing
//! [`crate::port::outbound::connector::ExchangeConnector`]. Use
//! [`build_connector`] to construct the right variant for an exchange id.

pub mod binance;
pub mod bitget;
pub mod gate;
mod http;
pub mod mexc;
pub mod okx;

pub use binance::BinanceConnector;
pub use bitget::BitgetConnector;
pub use gate::GateConnector;
pub use mexc::MexcConnector;
pub use okx::OkxConnector;

use crate::error::ConnectorError;
use crate::port::outbound::connector::{Credentials, ExchangeConnector, ExchangeId};

/// Build the connector for `id` with the given account credentials.
///
/// MEXC verifies API reachability during construction; the other variants
/// construct lazily and surface connectivity problems on first use.
pub async fn build_connector(
    id: ExchangeId,
    credentials: &Credentials,
) -> Result<Box<dyn ExchangeConnector>, ConnectorError> {
    Ok(match id {
        ExchangeId::Mexc => Box::new(MexcConnector::connect(credentials).await?),
        ExchangeId::Binance => Box::new(BinanceConnector::new(credentials)),
        ExchangeId::Okx => Box::new(OkxConnector::new(credentials)),
        ExchangeId::Bitget => Box::new(BitgetConnector::new(credentials)),
        ExchangeId::Gate => Box::new(GateConnector::new(credentials)),
    })
}
