//! Error types for Attendify

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The backend rejected the credential (HTTP 401). The session has already
    /// been cleared and a login redirect issued by the time this is returned.
    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not logged in. Run 'attendify login' first.")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'attendify init' first.")]
    ConfigNotFound,

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map a non-success HTTP status and its body text onto the error taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = backend_message(body);
        match status {
            401 => Error::Unauthorized { message },
            403 => Error::Forbidden { message },
            404 => Error::NotFound { message },
            409 => Error::Conflict { message },
            500..=599 => Error::Server { status, message },
            _ => Error::Validation { status, message },
        }
    }

    /// True for the failure class that triggers session recovery.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    /// HTTP status carried by backend failures, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::Forbidden { .. } => Some(403),
            Error::NotFound { .. } => Some(404),
            Error::Conflict { .. } => Some(409),
            Error::Validation { status, .. } | Error::Server { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Prefer the backend's `message` or `error` field, falling back to the raw body.
fn backend_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.to_string()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_taxonomy() {
        assert!(Error::from_status(401, "").is_unauthorized());
        assert!(matches!(Error::from_status(403, ""), Error::Forbidden { .. }));
        assert!(matches!(Error::from_status(404, ""), Error::NotFound { .. }));
        assert!(matches!(Error::from_status(409, ""), Error::Conflict { .. }));
        assert!(matches!(
            Error::from_status(422, ""),
            Error::Validation { status: 422, .. }
        ));
        assert!(matches!(
            Error::from_status(503, ""),
            Error::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_message_extraction() {
        let err = Error::from_status(400, r#"{"message":"Roll number taken"}"#);
        assert_eq!(err.to_string(), "Validation failed (400): Roll number taken");

        let err = Error::from_status(500, r#"{"error":"boom"}"#);
        assert_eq!(err.to_string(), "Server error (500): boom");

        let err = Error::from_status(404, "plain text");
        assert_eq!(err.to_string(), "Not found: plain text");
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(Error::from_status(409, "").status(), Some(409));
        assert_eq!(Error::NotAuthenticated.status(), None);
    }
}
