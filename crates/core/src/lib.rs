//! Compose Batch Core Library
//!
//! This crate provides the core of compose-batch, a tool that applies a
//! sequence of `docker compose` lifecycle actions (pull, build, up, down, ...)
//! across many independently deployed projects, each living in its own
//! directory under a common root.
//!
//! # Key Features
//!
//! - **Action Registry**: Fixed catalog of actions looked up by their flags
//! - **Target Resolution**: Project discovery, selection and ignore markers
//! - **Sequencing**: Actions run in the order their flags were given
//! - **Dispatch**: Dry runs, per-session confirmation and non-fatal failures
//! - **Configuration**: Optional YAML settings for root, env file and program
//!
//! # Examples
//!
//! Ordering requested actions by where their flags appeared:
//!
//! ```
//! use compose_batch_core::registry::ActionRegistry;
//! use compose_batch_core::sequencing::sequence;
//!
//! let registry = ActionRegistry::builtin()?;
//! let actions = sequence([("pull", 2), ("up", 1), ("pull", 4)], &registry);
//! let ids: Vec<&str> = actions.iter().map(|action| action.id).collect();
//! assert_eq!(ids, vec!["up", "pull"]);
//! # Ok::<(), compose_batch_core::error::Error>(())
//! ```

pub mod action_definitions;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod interaction;
pub mod projects;
pub mod registry;
pub mod sequencing;
