//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 207 Multi-Status (body lists per-entity outcome)
            Self::PartialFailure => StatusCode::MULTI_STATUS,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::ReceiptNotFound
            | Self::CatalogItemNotFound
            | Self::TimeLedgerNotFound
            | Self::LedgerMonthNotFound
            | Self::EodReportNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderAlreadyCheckedOut
            | Self::OrderClosed
            | Self::ReceiptClosed
            | Self::ShiftAlreadyOpen
            | Self::ShiftNotOpen
            | Self::DayCloseInProgress => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::IncompleteClose => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
