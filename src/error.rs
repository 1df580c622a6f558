//! Exit codes.

/// Exit codes for the filedupe application.
///
/// - 0: Success (scan completed and the manifest was written)
/// - 1: General error (unusable root, bad configuration or manifest failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: Scan completed and the manifest was written.
    Success = 0,
    /// General error: The run could not complete.
    GeneralError = 1,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FD000",
            Self::GeneralError => "FD001",
        }
    }
}
