//! Shared response plumbing for the exchange REST gateways.

use crate::error::ConnectorError;

pub(crate) fn transport(exchange: &'static str, source: reqwest::Error) -> ConnectorError {
    ConnectorError::Transport { exchange, source }
}

/// Read a response body, mapping non-2xx statuses to [`ConnectorError::Api`]
/// with the raw body preserved.
pub(crate) async fn read_json(
    exchange: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value, ConnectorError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| transport(exchange, source))?;

    if !status.is_success() {
        return Err(ConnectorError::Api {
            exchange,
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|err| ConnectorError::Api {
        exchange,
        status: status.as_u16(),
        body: format!("unexpected response shape ({err}): {body}"),
    })
}
