use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to dashboard consumers.
///
/// None of these are fatal: each request is isolated, and the HTTP layer turns
/// them into a JSON body built from [`ErrorBody`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    /// No provider credential configured. Raised before any outbound call.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Non-success response or network failure from the provider.
    #[error("Upstream request failed{}: {details}", status_suffix(.status))]
    Upstream { status: Option<u16>, details: String },

    /// Provider answered, but the payload did not have the expected shape.
    #[error("Unexpected upstream payload: {details}")]
    DataShape { details: String },

    /// Unknown city, period or series type in the request.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl DashboardError {
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn upstream<S: Into<String>>(status: Option<u16>, details: S) -> Self {
        Self::Upstream { status, details: details.into() }
    }

    pub fn data_shape<S: Into<String>>(details: S) -> Self {
        Self::DataShape { details: details.into() }
    }

    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Configuration { .. } => "configuration",
            DashboardError::Upstream { .. } => "upstream",
            DashboardError::DataShape { .. } => "data_shape",
            DashboardError::InvalidRequest { .. } => "invalid_request",
        }
    }

    /// Data-shape problems count as upstream failures for status purposes.
    pub fn http_status(&self) -> u16 {
        match self {
            DashboardError::InvalidRequest { .. } => 400,
            DashboardError::Configuration { .. }
            | DashboardError::Upstream { .. }
            | DashboardError::DataShape { .. } => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let (error, details) = match self {
            DashboardError::Configuration { message } => {
                ("API key not configured".to_string(), Some(message.clone()))
            }
            DashboardError::Upstream { details, .. } => {
                ("API fetch failed".to_string(), Some(details.clone()))
            }
            DashboardError::DataShape { details } => {
                ("API returned unexpected data".to_string(), Some(details.clone()))
            }
            DashboardError::InvalidRequest { message } => (message.clone(), None),
        };

        ErrorBody { error, kind: self.kind(), details }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

/// JSON error payload returned by the API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_includes_status_when_known() {
        let err = DashboardError::upstream(Some(401), "Invalid API key");
        assert_eq!(err.to_string(), "Upstream request failed with status 401: Invalid API key");

        let err = DashboardError::upstream(None, "connection refused");
        assert_eq!(err.to_string(), "Upstream request failed: connection refused");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(DashboardError::configuration("x").http_status(), 500);
        assert_eq!(DashboardError::data_shape("x").http_status(), 500);
        assert_eq!(DashboardError::invalid_request("x").http_status(), 400);
    }

    #[test]
    fn body_omits_details_for_invalid_requests() {
        let body = DashboardError::invalid_request("Unknown city 'atlantis'").to_body();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "Unknown city 'atlantis'");
        assert_eq!(json["kind"], "invalid_request");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn body_carries_upstream_detail() {
        let body = DashboardError::upstream(Some(502), "bad gateway").to_body();
        assert_eq!(body.error, "API fetch failed");
        assert_eq!(body.kind, "upstream");
        assert_eq!(body.details.as_deref(), Some("bad gateway"));
    }
}
