//! # Errors
//!
//! Reel uses one structured error type for everything that reaches a client.
//! Core goals:
//! - consistent status codes + class names
//! - can be carried through anyhow::Error
//! - transport-agnostic (the HTTP crate decides how to serialize)

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for Reel APIs.
pub type ReelResult<T> = std::result::Result<T, AnyError>;

/// Error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,          // 400
    NotFound,            // 404
    RangeNotSatisfiable, // 416
    GeneralError,        // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::RangeNotSatisfiable => 416,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::RangeNotSatisfiable => "RangeNotSatisfiable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::RangeNotSatisfiable => "range-not-satisfiable",
            ErrorKind::GeneralError => "general-error",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// A structured Reel error that can live inside `anyhow::Error`.
///
/// Fields:
/// - kind (status code + names)
/// - message (plain text shown to the client)
/// - data (optional, transport hints such as the total size for a 416)
/// - source (never shown to clients)
#[derive(Debug)]
pub struct ReelError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub source: Option<AnyError>,
}

impl ReelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error`.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to a `ReelError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&ReelError> {
        err.downcast_ref::<ReelError>()
    }

    /// Turn any error into a ReelError:
    /// - if it's already a ReelError, keep it (lossless)
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> ReelError {
        match err.downcast::<ReelError>() {
            Ok(reel) => reel,
            Err(other) => {
                ReelError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A version suitable for returning to clients: drops the inner `source`.
    pub fn sanitize_for_client(&self) -> ReelError {
        ReelError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            source: None,
        }
    }

    /// Total size carried by a 416 error, if any.
    pub fn total_size(&self) -> Option<u64> {
        self.data
            .as_ref()
            .and_then(|d| d.get("total_size"))
            .and_then(|v| v.as_u64())
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn range_not_satisfiable(total_size: u64) -> Self {
        Self::new(ErrorKind::RangeNotSatisfiable, "Requested range not satisfiable")
            .with_data(serde_json::json!({ "total_size": total_size }))
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for ReelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for ReelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Convenience helper for "bail with ReelError".
#[macro_export]
macro_rules! bail_reel {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::ReelError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::ReelError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(found: bool) -> ReelResult<u32> {
        if !found {
            bail_reel!(not_found, "Video not found");
        }
        Ok(7)
    }

    #[test]
    fn normalize_keeps_reel_errors() {
        let err = ReelError::bad_request("Only video files are allowed").into_anyhow();
        let reel = ReelError::normalize(err);
        assert_eq!(reel.kind, ErrorKind::BadRequest);
        assert_eq!(reel.code(), 400);
        assert_eq!(reel.message, "Only video files are allowed");
    }

    #[test]
    fn normalize_wraps_foreign_errors_as_general() {
        let reel = ReelError::normalize(anyhow::anyhow!("disk on fire"));
        assert_eq!(reel.kind, ErrorKind::GeneralError);
        assert!(reel.kind.is_server_error());
        assert!(reel.source.is_some());
        assert!(reel.sanitize_for_client().source.is_none());
    }

    #[test]
    fn range_error_carries_total_size() {
        let err = ReelError::range_not_satisfiable(1000);
        assert_eq!(err.code(), 416);
        assert_eq!(err.class_name(), "range-not-satisfiable");
        assert_eq!(err.total_size(), Some(1000));
    }

    #[test]
    fn bail_macro_returns_downcastable_error() {
        assert_eq!(lookup(true).unwrap(), 7);
        let err = lookup(false).unwrap_err();
        let reel = ReelError::from_anyhow(&err).unwrap();
        assert_eq!(reel.kind, ErrorKind::NotFound);
        assert_eq!(reel.to_string(), "NotFound (404): Video not found");
    }
}
