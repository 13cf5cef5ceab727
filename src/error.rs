//! Shared error-code contract.
//!
//! Every error enum in the crate implements [`ErrorCode`] so the CLI and the
//! logs can report a stable, grepable code next to the human message.

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Render an error as `[E_CODE] message`.
pub fn describe(err: &dyn ErrorCode) -> String {
    format!("[{}] {err}", err.error_code())
}
