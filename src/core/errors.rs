//! Error type shared by every client operation.

use thiserror::Error;

/// Custom error type for Terra client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration file or environment override is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not a bech32 `terra1...` account address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount cannot be expressed in base units.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Asset has no Terra denomination (or the denomination is unknown).
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// A key operation was attempted without a phrase, or after purge.
    #[error("Phrase must be provided")]
    MissingPhrase,

    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encoding or signing of a transaction failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction not found: {0}")]
    TxNotFound(String),

    /// The LCD answered with an error body or a non-2xx status.
    /// `code` is the gRPC status code of the body, when present.
    #[error("LCD error (status {status}): {message}")]
    Lcd { status: u16, code: Option<u64>, message: String },

    /// Transport level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The node rejected the transaction.
    #[error("Broadcast rejected (code {code}): {log}")]
    Broadcast { code: u32, log: String },

    /// No gas price is known for the requested fee denomination.
    #[error("Unsupported fee asset: {0}")]
    UnsupportedFeeAsset(String),
}

impl ClientError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Lcd { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result alias with [`ClientError`] as the default error.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lcd_error() {
        let err = ClientError::Lcd { status: 400, code: None, message: "bad request".to_string() };
        assert_eq!(format!("{}", err), "LCD error (status 400): bad request");
    }

    #[test]
    fn test_display_missing_phrase() {
        assert_eq!(ClientError::MissingPhrase.to_string(), "Phrase must be provided");
    }

    #[test]
    fn test_retryable() {
        assert!(ClientError::Network("reset".into()).is_retryable());
        assert!(ClientError::Lcd { status: 503, code: None, message: "busy".into() }.is_retryable());
        assert!(!ClientError::Lcd { status: 404, code: Some(5), message: "nope".into() }.is_retryable());
        assert!(!ClientError::MissingPhrase.is_retryable());
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
