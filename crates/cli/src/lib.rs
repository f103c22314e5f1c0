//! Compose Batch CLI Library
//!
//! This crate provides the command-line front-end of compose-batch. It parses
//! the command line, prints colored reports and asks for confirmation before
//! destructive actions; the actual dispatching lives in `compose-batch-core`.
//!
//! # Architecture
//!
//! - [`cli_args`]: Fixed options plus one flag per registered action
//! - [`console`]: Terminal reporter and stdin confirmation prompt
//! - [`status`]: Process exit status for a finished run
//!
//! # Examples
//!
//! ```bash
//! # List projects, marking ignored ones
//! cb --list
//!
//! # Pull, then build, then recreate two projects
//! cb -p -b -u web db
//!
//! # Show what `down` would do everywhere, without doing it
//! cb --dry --down --all
//!
//! # Prune unused docker data once, no project needed
//! cb --prune
//! ```

pub mod cli_args;
pub mod console;
pub mod status;
