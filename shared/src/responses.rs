use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Warning,
    Error,
}

/// Structured failure payload: what went wrong, for whom it matters, how bad.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub kind: String,
    pub message: String,
    pub severity: ErrorSeverity,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(
        kind: impl Into<String>,
        message: impl Into<String>,
        severity: ErrorSeverity,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                kind: kind.into(),
                message: message.into(),
                severity,
            }),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HeadpatResponse {
    pub message: &'static str,
}
