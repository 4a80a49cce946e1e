use reqwest::{Method, StatusCode};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("{method} {path} failed with {status}: {detail}")]
    Api {
        method: Method,
        path: String,
        status: StatusCode,
        detail: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Credential store read or write failed.
    #[error("Credential store error: {0}")]
    Store(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of an [`Error::Api`], if this is one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = Error::Api {
            method: Method::GET,
            path: "stations".into(),
            status: StatusCode::UNAUTHORIZED,
            detail: "expired".into(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "GET stations failed with 401 Unauthorized: expired");
    }

    #[test]
    fn non_api_errors_have_no_status() {
        let err = Error::Config("GAS_API_BASE_URL is required".into());
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
    }
}
