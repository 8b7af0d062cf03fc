use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response envelope
///
/// Every built-in endpoint answers with this shape; the numeric `status`
/// mirrors the HTTP status line.
///
/// # Example
/// ```
/// use ignite::common::ApiResponse;
/// use axum::http::StatusCode;
///
/// let ok = ApiResponse::success("pong");
/// assert_eq!(ok.status, 200);
///
/// let busy: ApiResponse<()> = ApiResponse::error(StatusCode::SERVICE_UNAVAILABLE, "warming up");
/// assert_eq!(busy.error.unwrap().code, "Service Unavailable");
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: u16,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    #[serde(skip)]
    pub http_status: StatusCode,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiResponse<()> {
    /// A 200 response without a payload.
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK, None)
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with data
    pub fn success(data: T) -> Self {
        Self::with_status(StatusCode::OK, Some(data))
    }

    fn with_status(status: StatusCode, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            success: status.is_success(),
            data,
            error: None,
            http_status: status,
        }
    }

    /// Create an error response
    ///
    /// The error `code` is the canonical reason phrase of `status`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let code = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());

        Self {
            status: status.as_u16(),
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            http_status: status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}
