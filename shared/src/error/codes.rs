//! Unified error codes for the POS back office
//!
//! This module defines all error codes used across pos-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Order / receipt errors
//! - 4xxx: Catalog errors
//! - 5xxx: Shift / time ledger errors
//! - 6xxx: End-of-day report errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Batch operation finished with some failed entries
    PartialFailure = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Order / Receipt ====================
    /// Order not found
    OrderNotFound = 3001,
    /// Order belongs to a business day that has been closed
    OrderClosed = 3002,
    /// Order already checked out into a receipt
    OrderAlreadyCheckedOut = 3003,
    /// Receipt not found
    ReceiptNotFound = 3101,
    /// Receipt belongs to a closed business day
    ReceiptClosed = 3102,

    // ==================== 4xxx: Catalog ====================
    /// Catalog item not found
    CatalogItemNotFound = 4001,

    // ==================== 5xxx: Shift / Time Ledger ====================
    /// Employee has no time ledger
    TimeLedgerNotFound = 5001,
    /// Month entry not present in the ledger
    LedgerMonthNotFound = 5002,
    /// Employee already has an open shift
    ShiftAlreadyOpen = 5003,
    /// Employee has no open shift
    ShiftNotOpen = 5004,

    // ==================== 6xxx: End of Day ====================
    /// EoD report not found
    EodReportNotFound = 6001,
    /// Another day close holds the lock
    DayCloseInProgress = 6002,
    /// Report persisted but archive/reset did not complete
    IncompleteClose = 6003,
    /// No day close waiting to be resumed
    NoPendingDayClose = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::PartialFailure => "Operation partially failed",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Order / Receipt
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderClosed => "Order belongs to a closed business day",
            ErrorCode::OrderAlreadyCheckedOut => "Order has already been checked out",
            ErrorCode::ReceiptNotFound => "Receipt not found",
            ErrorCode::ReceiptClosed => "Receipt belongs to a closed business day",

            // Catalog
            ErrorCode::CatalogItemNotFound => "Catalog item not found",

            // Shift
            ErrorCode::TimeLedgerNotFound => "Time ledger not found",
            ErrorCode::LedgerMonthNotFound => "No shifts recorded for this month",
            ErrorCode::ShiftAlreadyOpen => "Employee already has an open shift",
            ErrorCode::ShiftNotOpen => "Employee has no open shift",

            // End of Day
            ErrorCode::EodReportNotFound => "EoD report not found",
            ErrorCode::DayCloseInProgress => "A day close is already in progress, retry later",
            ErrorCode::IncompleteClose => {
                "EoD report was generated but archiving did not complete"
            }
            ErrorCode::NoPendingDayClose => "No day close is waiting to be resumed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::PartialFailure),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Order / Receipt
            3001 => Ok(ErrorCode::OrderNotFound),
            3002 => Ok(ErrorCode::OrderClosed),
            3003 => Ok(ErrorCode::OrderAlreadyCheckedOut),
            3101 => Ok(ErrorCode::ReceiptNotFound),
            3102 => Ok(ErrorCode::ReceiptClosed),

            // Catalog
            4001 => Ok(ErrorCode::CatalogItemNotFound),

            // Shift
            5001 => Ok(ErrorCode::TimeLedgerNotFound),
            5002 => Ok(ErrorCode::LedgerMonthNotFound),
            5003 => Ok(ErrorCode::ShiftAlreadyOpen),
            5004 => Ok(ErrorCode::ShiftNotOpen),

            // End of Day
            6001 => Ok(ErrorCode::EodReportNotFound),
            6002 => Ok(ErrorCode::DayCloseInProgress),
            6003 => Ok(ErrorCode::IncompleteClose),
            6004 => Ok(ErrorCode::NoPendingDayClose),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
