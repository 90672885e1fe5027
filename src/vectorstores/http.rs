use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ChainError, Result};

/// Sends `request` once and decodes a 2xx JSON body. `service` names the
/// operation in errors and logs.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &str,
) -> Result<T> {
    let response = request.send().await.map_err(|source| ChainError::Http {
        operation: service.to_string(),
        source,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|source| ChainError::Http {
        operation: service.to_string(),
        source,
    })?;

    if !status.is_success() {
        warn!(service, %status, "request rejected");
        return Err(ChainError::Status {
            service: service.to_string(),
            status,
            body,
        });
    }
    debug!(service, %status, bytes = body.len(), "request succeeded");

    serde_json::from_str(&body).map_err(|source| ChainError::Decode {
        operation: service.to_string(),
        source,
    })
}
