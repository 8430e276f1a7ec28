use std::process::ExitCode;

/// Process exit status of the hoist CLI.
///
/// - `Success` (0): nothing to report (no repeated expressions, selection extractable)
/// - `Failure` (1): findings reported (candidates, parse errors, rejected selection)
/// - `Error` (2): the command could not run (bad configuration, unreadable input)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::Error => 2,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
