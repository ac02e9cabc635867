// ABOUTME: Error types for the harvest pipeline including the ErrorCode enum and HarvestError struct.
// ABOUTME: Provides one constructor per pipeline failure plus boolean helpers for callers and tests.

use std::fmt;

/// Error codes, one per fatal pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Network,
    HttpStatus,
    NoRepositoriesFound,
    Write,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Network => "network error",
            ErrorCode::HttpStatus => "unexpected HTTP status",
            ErrorCode::NoRepositoriesFound => "no repositories found",
            ErrorCode::Write => "write error",
        };
        write!(f, "{}", s)
    }
}

/// The error type for every fallible pipeline stage.
///
/// `target` is the URL being fetched or the file being written, `op` names
/// the stage that failed (`Fetch`, `Extract`, `Write`).
#[derive(Debug, thiserror::Error)]
pub struct HarvestError {
    pub code: ErrorCode,
    pub target: String,
    pub op: String,
    /// HTTP status code, set only for `ErrorCode::HttpStatus`.
    pub status: Option<u16>,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for HarvestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "harvest: {} {}: {}", self.op, self.target, self.code)?;
        if let Some(status) = self.status {
            write!(f, " {}", status)?;
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl HarvestError {
    fn new(
        code: ErrorCode,
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            target: target.into(),
            op: op.into(),
            status: None,
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, target, op, source)
    }

    /// Create a Network error (connect, DNS, timeout, body read).
    pub fn network(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Network, target, op, source)
    }

    /// Create an HttpStatus error carrying the response status code.
    pub fn http_status(target: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorCode::HttpStatus, target, op, None)
        }
    }

    /// Create a NoRepositoriesFound error.
    pub fn no_repositories(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NoRepositoriesFound, target, op, source)
    }

    /// Create a Write error.
    pub fn write(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Write, target, op, source)
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Network error.
    pub fn is_network(&self) -> bool {
        self.code == ErrorCode::Network
    }

    /// Returns true if this is an HttpStatus error.
    pub fn is_http_status(&self) -> bool {
        self.code == ErrorCode::HttpStatus
    }

    /// Returns true if this is a NoRepositoriesFound error.
    pub fn is_no_repositories(&self) -> bool {
        self.code == ErrorCode::NoRepositoriesFound
    }

    /// Returns true if this is a Write error.
    pub fn is_write(&self) -> bool {
        self.code == ErrorCode::Write
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HarvestError>;
