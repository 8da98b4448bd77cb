//! Process termination at the end of a start cycle.

use std::process::ExitCode;

/// Exit status of a finished start cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// The daemon stopped gracefully.
    Success,
    /// The daemon aborted after a fatal error.
    Aborted,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Aborted => 1,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => Self::SUCCESS,
            ExitStatus::Aborted => Self::FAILURE,
        }
    }
}

/// Ends the process once a start cycle has finished.
pub trait ProcessTerminator: Send + Sync {
    /// Terminates with `status`.
    fn terminate(&self, status: ExitStatus);
}

/// Terminator that exits the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTerminator;

impl ProcessTerminator for SystemTerminator {
    fn terminate(&self, status: ExitStatus) {
        std::process::exit(status.code());
    }
}
