//! Unified error codes for Mostrador
//!
//! Error codes are organized by category:
//! - 0xxx: General errors (request shape, generic store outcomes)
//! - 1xxx: Product / category errors
//! - 2xxx: Client errors
//! - 3xxx: Sale / cart errors
//! - 4xxx: Expense errors
//! - 5xxx: Report errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the dashboard frontend
/// can switch on them without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Product ====================
    ProductNotFound = 1001,
    ProductInvalidPrice = 1002,
    ProductOutOfStock = 1003,
    ProductInactive = 1004,
    CategoryNotFound = 1101,
    CategoryHasProducts = 1102,
    CategoryNameExists = 1103,

    // ==================== 2xxx: Client ====================
    ClientNotFound = 2001,
    ClientEmailExists = 2002,

    // ==================== 3xxx: Sale ====================
    SaleNotFound = 3001,
    /// Sale has no line items
    SaleEmpty = 3002,
    SaleInvalidDiscount = 3003,
    /// Status change not allowed from the current status
    SaleInvalidTransition = 3004,
    /// A submission for this cart is already running
    SaleSubmissionInProgress = 3005,
    SaleLineNotFound = 3006,
    /// Requested quantity exceeds available stock
    InsufficientStock = 3007,

    // ==================== 4xxx: Expense ====================
    ExpenseNotFound = 4001,
    ExpenseInvalidAmount = 4002,

    // ==================== 5xxx: Report ====================
    ReportInvalidPeriod = 5001,
    ReportInvalidRange = 5002,
    ReportExportFailed = 5003,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    OperationCancelled = 9006,

    // ==================== 94xx: Storage ====================
    StorageCorrupted = 9403,
    StorageUnavailable = 9404,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::ProductOutOfStock => "Product is out of stock",
            ErrorCode::ProductInactive => "Product is inactive",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category has associated products",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Client
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::ClientEmailExists => "Client email already exists",

            // Sale
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::SaleEmpty => "Sale has no items",
            ErrorCode::SaleInvalidDiscount => "Discount must be a non-negative amount",
            ErrorCode::SaleInvalidTransition => "Sale status change not allowed",
            ErrorCode::SaleSubmissionInProgress => "Sale submission already in progress",
            ErrorCode::SaleLineNotFound => "Sale item not found",
            ErrorCode::InsufficientStock => "Insufficient stock",

            // Expense
            ErrorCode::ExpenseNotFound => "Expense not found",
            ErrorCode::ExpenseInvalidAmount => "Expense amount must be positive",

            // Report
            ErrorCode::ReportInvalidPeriod => "Invalid report period",
            ErrorCode::ReportInvalidRange => "Invalid report date range",
            ErrorCode::ReportExportFailed => "Report export failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::OperationCancelled => "Operation cancelled",

            // Storage
            ErrorCode::StorageCorrupted => "Storage corrupted (stored data is malformed)",
            ErrorCode::StorageUnavailable => "Storage backend unavailable",
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
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Product
            1001 => Ok(ErrorCode::ProductNotFound),
            1002 => Ok(ErrorCode::ProductInvalidPrice),
            1003 => Ok(ErrorCode::ProductOutOfStock),
            1004 => Ok(ErrorCode::ProductInactive),
            1101 => Ok(ErrorCode::CategoryNotFound),
            1102 => Ok(ErrorCode::CategoryHasProducts),
            1103 => Ok(ErrorCode::CategoryNameExists),

            // Client
            2001 => Ok(ErrorCode::ClientNotFound),
            2002 => Ok(ErrorCode::ClientEmailExists),

            // Sale
            3001 => Ok(ErrorCode::SaleNotFound),
            3002 => Ok(ErrorCode::SaleEmpty),
            3003 => Ok(ErrorCode::SaleInvalidDiscount),
            3004 => Ok(ErrorCode::SaleInvalidTransition),
            3005 => Ok(ErrorCode::SaleSubmissionInProgress),
            3006 => Ok(ErrorCode::SaleLineNotFound),
            3007 => Ok(ErrorCode::InsufficientStock),

            // Expense
            4001 => Ok(ErrorCode::ExpenseNotFound),
            4002 => Ok(ErrorCode::ExpenseInvalidAmount),

            // Report
            5001 => Ok(ErrorCode::ReportInvalidPeriod),
            5002 => Ok(ErrorCode::ReportInvalidRange),
            5003 => Ok(ErrorCode::ReportExportFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9006 => Ok(ErrorCode::OperationCancelled),

            // Storage
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::StorageUnavailable),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
