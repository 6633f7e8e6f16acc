//! Planning API error types.

/// Shown when the backend gives no usable explanation.
pub const FALLBACK_MESSAGE: &str = "Failed to plan route. Please try again.";

/// Errors from the eco-planning API.
#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    /// HTTP request failed (connection refused, DNS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The request exceeded the client timeout
    #[error("request timed out")]
    Timeout,

    /// API returned an error status
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl From<reqwest::Error> for PlanningError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PlanningError::Timeout
        } else {
            PlanningError::Http(err)
        }
    }
}

impl PlanningError {
    /// Build an API error from a status and raw response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        PlanningError::Api {
            status,
            detail: extract_detail(body),
        }
    }

    /// The backend's own explanation, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            PlanningError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message to show the user.
    pub fn user_message(&self) -> String {
        self.detail().unwrap_or(FALLBACK_MESSAGE).to_string()
    }
}

/// Pull a non-empty string `detail` field out of an error body.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?.as_str()?.trim();
    (!detail.is_empty()).then(|| detail.to_string())
}
