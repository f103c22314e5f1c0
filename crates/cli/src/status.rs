//! Maps the result of a run to the process exit status.

use std::process::ExitCode;

use compose_batch_core::dispatch::DispatchOutcome;
use compose_batch_core::error::Result;

/// Whether a run counts as successful.
///
/// Listing, having nothing to do and a completed batch without failed
/// invocations all succeed; declined confirmations and skipped projects are
/// not failures. Any error, or any failed invocation, fails the run.
#[must_use]
pub fn run_succeeded(result: &Result<DispatchOutcome>) -> bool {
    match result {
        Ok(DispatchOutcome::Listed(_) | DispatchOutcome::NothingToDo) => true,
        Ok(DispatchOutcome::Completed(summary)) => !summary.has_failures(),
        Err(_) => false,
    }
}

#[must_use]
pub fn exit_status(result: &Result<DispatchOutcome>) -> ExitCode {
    if run_succeeded(result) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
