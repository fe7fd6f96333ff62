//! Error types shared by the webset crates

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum WebsetError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Format error for item {item_id}: {message}")]
    Format { item_id: String, message: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse HTTP classification of an error, derived from its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpClass {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Internal,
}

impl HttpClass {
    /// Sniff a free-text error message for a status class.
    ///
    /// Checks run in a fixed order: not-found, unauthorized, forbidden,
    /// bad request. Anything else is internal.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("not found") || lower.contains("does not exist") {
            HttpClass::NotFound
        } else if lower.contains("unauthorized") || lower.contains("authentication") {
            HttpClass::Unauthorized
        } else if lower.contains("forbidden") || lower.contains("permission") {
            HttpClass::Forbidden
        } else if lower.contains("invalid") || lower.contains("bad request") {
            HttpClass::BadRequest
        } else {
            HttpClass::Internal
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            HttpClass::BadRequest => 400,
            HttpClass::Unauthorized => 401,
            HttpClass::Forbidden => 403,
            HttpClass::NotFound => 404,
            HttpClass::Internal => 500,
        }
    }
}

impl WebsetError {
    pub fn api(msg: impl Into<String>) -> Self {
        WebsetError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        WebsetError::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        WebsetError::Auth(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        WebsetError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        WebsetError::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        WebsetError::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        WebsetError::Validation(msg.into())
    }

    pub fn format(item_id: impl Into<String>, message: impl Into<String>) -> Self {
        WebsetError::Format {
            item_id: item_id.into(),
            message: message.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        WebsetError::Export(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        WebsetError::Internal(msg.into())
    }

    /// Message without the variant prefix, for user-facing error bodies
    pub fn detail(&self) -> String {
        match self {
            WebsetError::Api(msg) | WebsetError::Network(msg) | WebsetError::Internal(msg) => {
                msg.clone()
            }
            other => other.to_string(),
        }
    }

    /// Status class for surfacing this error over HTTP.
    ///
    /// Configuration problems are always internal; everything else is
    /// classified from the rendered message.
    pub fn http_class(&self) -> HttpClass {
        match self {
            WebsetError::Config(_) | WebsetError::Internal(_) => HttpClass::Internal,
            other => HttpClass::from_message(&other.to_string()),
        }
    }
}

/// Result type alias for webset operations
pub type WebsetResult<T> = Result<T, WebsetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_classification_order() {
        assert_eq!(
            HttpClass::from_message("Webset does not exist"),
            HttpClass::NotFound
        );
        assert_eq!(
            HttpClass::from_message("401 Unauthorized"),
            HttpClass::Unauthorized
        );
        assert_eq!(
            HttpClass::from_message("missing permission for resource"),
            HttpClass::Forbidden
        );
        assert_eq!(
            HttpClass::from_message("Invalid enrichment format"),
            HttpClass::BadRequest
        );
        assert_eq!(HttpClass::from_message("socket hang up"), HttpClass::Internal);
        // not-found wins over invalid when both appear
        assert_eq!(
            HttpClass::from_message("invalid id: not found"),
            HttpClass::NotFound
        );
    }

    #[test]
    fn test_error_http_class() {
        let err = WebsetError::api("request failed with 404 Not Found: webset missing");
        assert_eq!(err.http_class().status_code(), 404);

        let err = WebsetError::config("EXA_API_KEY not found");
        assert_eq!(err.http_class(), HttpClass::Internal);

        let err = WebsetError::validation("count must be between 1 and 100");
        assert_eq!(err.http_class(), HttpClass::BadRequest);
    }
}
