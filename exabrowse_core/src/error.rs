use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    /// Caller input was missing or malformed. No provider was contacted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required credential or setting is absent. No provider was contacted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A provider answered with a non-success status or an unusable payload.
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },

    /// A proxied upstream page answered with a non-success status.
    #[error("Failed to fetch URL: {status}")]
    Upstream { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BrowseError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        BrowseError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            BrowseError::InvalidInput(_) => "invalid_input",
            BrowseError::Configuration(_) => "config_missing",
            BrowseError::Provider { .. } => "upstream_error",
            BrowseError::Upstream { .. } => "upstream_error",
            BrowseError::HttpRequest(_) => "upstream_error",
            BrowseError::SerdeJson(_) => "parse_error",
            BrowseError::SerdeYaml(_) | BrowseError::Toml(_) => "config_invalid",
            BrowseError::Io(_) | BrowseError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status a hosting web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            BrowseError::InvalidInput(_) => 400,
            BrowseError::Configuration(_) => 500,
            BrowseError::Provider { .. } | BrowseError::HttpRequest(_) => 502,
            BrowseError::Upstream { status, .. } => *status,
            _ => 500,
        }
    }

    /// `{ "error": ..., "details"?: ... }` body matching the status above.
    pub fn to_error_body(&self) -> Value {
        match self {
            BrowseError::InvalidInput(msg) | BrowseError::Configuration(msg) => {
                json!({ "error": msg })
            }
            BrowseError::Upstream { status, message } => json!({
                "error": format!("Failed to fetch URL: {} {}", status, message).trim_end(),
            }),
            err => json!({
                "error": "Request to upstream provider failed.",
                "details": err.to_string(),
            }),
        }
    }
}

pub type Result<T> = std::result::Result<T, BrowseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_errors() {
        let err = BrowseError::InvalidInput("Provide a non-empty query.".into());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code_str(), "invalid_input");
        assert_eq!(err.to_error_body()["error"], "Provide a non-empty query.");
    }

    #[test]
    fn missing_credentials_are_server_errors() {
        let err = BrowseError::Configuration("EXA_API_KEY not configured".into());
        assert_eq!(err.status_code(), 500);
        assert!(err.to_error_body().get("details").is_none());
    }

    #[test]
    fn provider_errors_carry_details() {
        let err = BrowseError::provider("Exa", "429 Too Many Requests");
        assert_eq!(err.status_code(), 502);
        let body = err.to_error_body();
        assert_eq!(body["details"], "Exa API error: 429 Too Many Requests");
    }
}
