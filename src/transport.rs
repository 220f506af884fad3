use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Failure raised by a transport collaborator. The core treats
/// authentication, network, and remote-validation failures alike: they are
/// wrapped into [`ServiceError::ExternalService`] and never retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Fault reported by the remote service, with its message when available.
    #[error("remote fault: {0}")]
    Fault(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<TransportError> for ServiceError {
    fn from(err: TransportError) -> Self {
        ServiceError::ExternalService(err.to_string())
    }
}

/// Async request seam consumed by the façade. Given an operation name and a
/// payload, returns the raw response value or fails. Implementations own
/// retry, timeout, and cancellation policy; the core defines none.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, operation: &str, payload: Value) -> Result<Value, TransportError>;
}

/// Default transport posting JSON to a gateway that fronts the provider's
/// SOAP and REST endpoints. Cookie storage is enabled because the account
/// service tracks its session via cookies.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url_for(&self, operation: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), operation)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, payload), fields(operation = operation))]
    async fn request(&self, operation: &str, payload: Value) -> Result<Value, TransportError> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, "dispatching remote operation");
        let response = self
            .client
            .post(self.url_for(operation))
            .header("x-request-id", request_id.to_string())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_fault_message(&body)
                .unwrap_or_else(|| format!("{} returned status {}", operation, status));
            return Err(TransportError::Fault(message));
        }

        let value = response.json::<Value>().await?;
        Ok(value)
    }
}

/// Pulls the remote fault message out of an error body when one is present.
fn extract_fault_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("faultstring")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let transport = HttpTransport::new("https://gateway.invalid/api/").expect("client");
        assert_eq!(
            transport.url_for("retrievePageFormats"),
            "https://gateway.invalid/api/retrievePageFormats"
        );
    }

    #[test]
    fn fault_message_is_extracted() {
        assert_eq!(
            extract_fault_message(r#"{"faultstring": "invalid token"}"#),
            Some("invalid token".to_string())
        );
        assert_eq!(
            extract_fault_message(r#"{"message": "unknown product"}"#),
            Some("unknown product".to_string())
        );
        assert_eq!(extract_fault_message("not json"), None);
    }

    #[test]
    fn transport_error_wraps_into_service_error() {
        let err: ServiceError = TransportError::Fault("invalid token".into()).into();
        assert!(matches!(err, ServiceError::ExternalService(_)));
        assert!(err.to_string().contains("invalid token"));
    }
}
