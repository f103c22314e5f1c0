//! Command-line argument parsing.
//!
//! The fixed options are declared with the `clap` derive API. Action flags
//! come from the [`ActionRegistry`] and are appended at runtime, so adding an
//! action to the catalog is enough to expose it on the command line.

use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser};
use compose_batch_core::action_definitions::ActionDefinition;
use compose_batch_core::config::ALL_PROJECTS_TOKEN;
use compose_batch_core::dispatch::{DispatchRequest, TargetSelection};
use compose_batch_core::registry::ActionRegistry;
use compose_batch_core::sequencing::sequence;

/// Flags owned by the front-end; no action may use them.
pub const RESERVED_FLAGS: &[&str] = &[
    "--dry",
    "-l",
    "--list",
    "-a",
    "--all",
    "-y",
    "--yes",
    "--root",
    "--env-file",
    "-c",
    "--config-path",
    "-h",
    "--help",
    "-V",
    "--version",
];

/// Command-line arguments for the `cb` binary, apart from the action flags.
#[derive(Parser, Debug)] // requires `derive` feature
#[command(
    name = "cb",
    version,
    about = "Batch docker compose helper across projects.",
    after_help = "Actions run in the order their flags are given, e.g. `cb -p -b -u web` pulls, builds, then starts `web`."
)]
#[command(term_width = 0)] // Just to make testing across clap features easier
#[allow(clippy::struct_excessive_bools)] // silence clippy's warning on this struct
pub struct Args {
    /// Dry run: show what would run, without changing anything.
    #[arg(long, action)]
    pub dry: bool,

    /// Display available projects and exit.
    #[arg(long, short = 'l', action)]
    pub list: bool,

    /// Target all available projects.
    #[arg(long, short = 'a', action)]
    pub all: bool,

    /// Answer "yes" to every confirmation prompt.
    #[arg(long, short = 'y', action)]
    pub yes: bool,

    /// Directory holding the projects.
    ///
    /// Overrides `root` from the config file. Defaults to the current directory.
    #[arg(long)]
    pub root: Option<String>,

    /// Env file passed to `docker compose`, relative to each project directory.
    ///
    /// Defaults to `../secret.env`. An empty value leaves out `--env-file`.
    #[arg(long)]
    pub env_file: Option<String>,

    /// Path to the config file YAML.
    ///
    /// If not provided, defaults to `~/.compose-batch/config.yml` when it exists.
    #[arg(long, short = 'c')]
    pub config_path: Option<String>,

    /// Project names (directories under the root). `all` targets every project.
    pub projects: Vec<String>,
}

impl Args {
    /// Turns the parsed arguments and sequenced actions into a dispatch request.
    #[must_use]
    pub fn request<'r>(&self, actions: Vec<&'r ActionDefinition>) -> DispatchRequest<'r> {
        let targets = if self.all || self.projects.iter().any(|p| p == ALL_PROJECTS_TOKEN) {
            TargetSelection::All
        } else {
            TargetSelection::Named(self.projects.clone())
        };

        DispatchRequest {
            list: self.list,
            actions,
            targets,
            dry_run: self.dry,
        }
    }
}

/// Builds the full `clap` command: the derived options plus one flag per
/// action, in registry order.
pub fn build_command(registry: &ActionRegistry) -> clap::Command {
    registry.iter().fold(Args::command(), |command, action| {
        command.arg(
            Arg::new(action.id)
                .short(action.short_flag)
                .long(action.long_flag)
                .help(action.description)
                .help_heading("Actions")
                // Repeating an action flag is harmless, the action still runs once
                .action(ArgAction::Count),
        )
    })
}

/// Parses `tokens` (program name first) and returns the arguments together
/// with the requested actions in command-line order.
///
/// # Errors
///
/// Returns the `clap` error for invalid input, including `--help` and
/// `--version`.
pub fn parse_from<'r, S: AsRef<str>>(
    registry: &'r ActionRegistry,
    tokens: &[S],
) -> Result<(Args, Vec<&'r ActionDefinition>), clap::Error> {
    let matches = build_command(registry)
        .try_get_matches_from(tokens.iter().map(|token| token.as_ref().to_string()))?;
    let args = Args::from_arg_matches(&matches)?;

    // clap knows which tokens are option values, so its indices are the
    // only reliable source for flag positions
    let occurrences = registry.iter().flat_map(|action| {
        matches
            .indices_of(action.id)
            .into_iter()
            .flatten()
            .map(move |index| (action.id, index))
    });

    Ok((args, sequence(occurrences, registry)))
}
