use serde::Serialize;

/// Service-wide error type.
///
/// Validation errors (`VoucherLayout`, `Address`, `Product`) are raised
/// synchronously from cart mutation and never leave the cart in a partially
/// applied state. `Checkout` and `PageFormat` are raised before any network
/// call is made. `ExternalService` wraps transport faults verbatim; the cart
/// is left untouched and no retry is attempted.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Voucher layout error: {0}")]
    VoucherLayout(String),

    #[error("Address error: {0}")]
    Address(String),

    #[error("Product error: {0}")]
    Product(String),

    #[error("Checkout error: {0}")]
    Checkout(String),

    #[error("Page format error: {0}")]
    PageFormat(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl ServiceError {
    /// Message suitable for surfacing to library consumers. Remote fault
    /// messages are passed through; everything else uses the display form.
    pub fn response_message(&self) -> String {
        self.to_string()
    }

    /// True for errors raised by local validation rather than a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::VoucherLayout(_) | Self::Address(_) | Self::Product(_)
        )
    }
}

/// Machine-readable error kind, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Precondition,
    Placement,
    Transport,
    Auth,
    Cache,
    Other,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VoucherLayout(_) | Self::Address(_) | Self::Product(_) => ErrorKind::Validation,
            Self::Checkout(_) => ErrorKind::Precondition,
            Self::PageFormat(_) => ErrorKind::Placement,
            Self::ExternalService(_) => ErrorKind::Transport,
            Self::Unauthorized(_) => ErrorKind::Auth,
            Self::Cache(_) => ErrorKind::Cache,
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(ServiceError::VoucherLayout("x".into()).is_validation());
        assert!(ServiceError::Address("x".into()).is_validation());
        assert!(ServiceError::Product("x".into()).is_validation());
        assert!(!ServiceError::Checkout("x".into()).is_validation());
    }

    #[test]
    fn kinds_classify_checkout_failures() {
        assert_eq!(
            ServiceError::Checkout("empty".into()).kind(),
            ErrorKind::Precondition
        );
        assert_eq!(
            ServiceError::PageFormat("out of range".into()).kind(),
            ErrorKind::Placement
        );
        assert_eq!(
            ServiceError::ExternalService("fault".into()).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn display_includes_message() {
        let err = ServiceError::Product("product 42 has no price".into());
        assert_eq!(err.to_string(), "Product error: product 42 has no price");
    }
}
