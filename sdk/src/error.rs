use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    std::{fmt, path::PathBuf},
    thiserror::Error,
};

/// Status reported when a request failed before any response was received.
pub const REQUEST_FAILED_STATUS: &str = "REQUEST_FAILED";
/// Status reported when neither the body nor the HTTP reason name one.
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Structured error of a failed Walrus API request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalrusApiError {
    pub code: u16,
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
    /// What the client was doing when the request failed.
    #[serde(default)]
    pub context: String,
}

impl WalrusApiError {
    pub fn new(
        code: u16,
        status: impl Into<String>,
        message: impl Into<String>,
        details: Vec<serde_json::Value>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            code,
            status: status.into(),
            message: message.into(),
            details,
            context: context.into(),
        }
    }

    /// Build an error from the parts of a non-successful HTTP response.
    ///
    /// A JSON body with a top-level `error` object wins. Anything else falls
    /// back to the HTTP status and its reason phrase.
    pub fn from_response_parts(
        status_code: u16,
        reason: Option<&str>,
        body: &[u8],
        context: impl Into<String>,
    ) -> Self {
        if let Some(error) = error_object(body) {
            let details = match error.get("details") {
                None | Some(Value::Null) => vec![],
                Some(Value::Array(details)) => details.clone(),
                Some(other) => vec![other.clone()],
            };

            return Self::new(
                error
                    .get("code")
                    .and_then(Value::as_u64)
                    .and_then(|code| u16::try_from(code).ok())
                    .unwrap_or(status_code),
                text_field(&error, "status").unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
                text_field(&error, "message").unwrap_or_default(),
                details,
                context,
            );
        }

        let status = reason
            .filter(|reason| !reason.is_empty())
            .unwrap_or(UNKNOWN_STATUS);

        Self::new(
            status_code,
            status,
            format!("HTTP {status_code}: {status}"),
            vec![],
            context,
        )
    }

    /// Build an error for a request that never got a response (connection
    /// refused, timeout, DNS failure...).
    pub fn request_failed(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::new(500, REQUEST_FAILED_STATUS, message, vec![], context)
    }

    /// The error prefixed with its context.
    pub fn describe(&self) -> String {
        if self.context.is_empty() {
            return self.to_string();
        }

        format!("{}: {}", self.context, self)
    }
}

impl fmt::Display for WalrusApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} - {}: {}", self.code, self.status, self.message)?;

        if !self.details.is_empty() {
            let details = serde_json::to_string(&self.details).map_err(|_| fmt::Error)?;

            write!(f, " (Details: {details})")?;
        }

        Ok(())
    }
}

impl std::error::Error for WalrusApiError {}

/// The `error` object of a `{"error": {"code": .., "status": .., "message": ..,
/// "details": [..]}}` envelope, if the body is one.
fn error_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Object(mut envelope) => match envelope.remove("error")? {
            Value::Object(error) => Some(error),
            _ => None,
        },
        _ => None,
    }
}

/// String fields are taken as-is, anything else non-null is rendered as JSON.
fn text_field(error: &Map<String, Value>, key: &str) -> Option<String> {
    match error.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Every error the Walrus SDK can return.
#[derive(Debug, Error)]
pub enum WalrusError {
    #[error("{}", .0.describe())]
    Api(#[from] WalrusApiError),
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl WalrusError {
    /// Wrap an IO error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// The API status code, if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.code),
            _ => None,
        }
    }
}

pub type WalrusResult<T, E = WalrusError> = Result<T, E>;
