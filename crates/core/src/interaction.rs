//! Seams between the dispatcher and the user.

use std::fmt::{Display, Formatter};

use crate::error::Result;

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Display for ReportLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReportLevel::Info => "info",
            ReportLevel::Success => "success",
            ReportLevel::Warning => "warning",
            ReportLevel::Error => "error",
        })
    }
}

/// Sink for user-facing messages. Reporting never affects control flow.
pub trait Reporter {
    fn report(&mut self, level: ReportLevel, message: &str);

    fn info(&mut self, message: &str) {
        self.report(ReportLevel::Info, message);
    }

    fn success(&mut self, message: &str) {
        self.report(ReportLevel::Success, message);
    }

    fn warning(&mut self, message: &str) {
        self.report(ReportLevel::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.report(ReportLevel::Error, message);
    }
}

/// Asks the user a yes/no question.
pub trait Confirmer {
    /// Returns `true` only for an affirmative answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// The single accepted affirmative answer, compared case-insensitively.
pub const AFFIRMATIVE_ANSWER: &str = "y";

/// Whether a raw line of input counts as "yes".
#[must_use]
pub fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(AFFIRMATIVE_ANSWER)
}
