use std::fmt::{Display, Formatter};

use crate::config::ComposeSettings;
use crate::error::Result;
use crate::execution;

/// A zero-argument operation that runs without any project context.
#[derive(Debug, Clone, Copy)]
pub struct StandaloneOperation {
    /// Shown in place of a command line, e.g. during a dry run.
    pub name: &'static str,
    pub run: fn() -> Result<()>,
}

impl Display for StandaloneOperation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)
    }
}

/// How an action is carried out.
#[derive(Debug, Clone, Copy)]
pub enum Invocation {
    /// Compose subcommand arguments, appended to the shared compose prefix and
    /// run inside each project directory.
    Compose(&'static [&'static str]),
    Standalone(StandaloneOperation),
}

/// An immutable entry of the action catalog.
#[derive(Debug, Clone, Copy)]
pub struct ActionDefinition {
    pub id: &'static str,
    pub short_flag: char,
    pub long_flag: &'static str,
    pub description: &'static str,
    pub invocation: Invocation,
    pub requires_confirmation: bool,
}

impl ActionDefinition {
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        matches!(self.invocation, Invocation::Standalone(_))
    }

    /// Both flags in their command-line form, short first.
    #[must_use]
    pub fn flags(&self) -> [String; 2] {
        [
            format!("-{}", self.short_flag),
            format!("--{}", self.long_flag),
        ]
    }

    /// Full argument vector for a compose action, `None` for standalone ones.
    #[must_use]
    pub fn command_line(&self, settings: &ComposeSettings) -> Option<Vec<String>> {
        match self.invocation {
            Invocation::Compose(arguments) => {
                let mut command_line = settings.prefix();
                command_line.extend(arguments.iter().map(ToString::to_string));
                Some(command_line)
            }
            Invocation::Standalone(_) => None,
        }
    }

    /// What would run, as shown to the user.
    #[must_use]
    pub fn display_invocation(&self, settings: &ComposeSettings) -> String {
        match self.invocation {
            Invocation::Compose(_) => self.command_line(settings).unwrap_or_default().join(" "),
            Invocation::Standalone(operation) => operation.to_string(),
        }
    }
}

impl Display for ActionDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.id)
    }
}

fn prune_system() -> Result<()> {
    execution::run_docker(&["system", "prune", "--force"])
}

fn show_disk_usage() -> Result<()> {
    execution::run_docker(&["system", "df"])
}

/// The built-in catalog, in the order it is shown in help output.
pub const BUILTIN_ACTIONS: &[ActionDefinition] = &[
    ActionDefinition {
        id: "pull",
        short_flag: 'p',
        long_flag: "pull",
        description: "docker compose pull",
        invocation: Invocation::Compose(&["pull"]),
        requires_confirmation: false,
    },
    ActionDefinition {
        id: "build",
        short_flag: 'b',
        long_flag: "build",
        description: "docker compose build",
        invocation: Invocation::Compose(&["build"]),
        requires_confirmation: false,
    },
    ActionDefinition {
        id: "up",
        short_flag: 'u',
        long_flag: "up",
        description: "docker compose up (detached, recreating containers)",
        invocation: Invocation::Compose(&["up", "-d", "--force-recreate"]),
        requires_confirmation: false,
    },
    ActionDefinition {
        id: "restart",
        short_flag: 'r',
        long_flag: "restart",
        description: "docker compose restart",
        invocation: Invocation::Compose(&["restart"]),
        requires_confirmation: false,
    },
    ActionDefinition {
        id: "stop",
        short_flag: 's',
        long_flag: "stop",
        description: "docker compose stop",
        invocation: Invocation::Compose(&["stop"]),
        requires_confirmation: false,
    },
    ActionDefinition {
        id: "down",
        short_flag: 'd',
        long_flag: "down",
        description: "docker compose down",
        invocation: Invocation::Compose(&["down"]),
        requires_confirmation: true,
    },
    ActionDefinition {
        id: "prune",
        short_flag: 'P',
        long_flag: "prune",
        description: "docker system prune --force (always docker, runs once, not per project)",
        invocation: Invocation::Standalone(StandaloneOperation {
            name: "docker system prune --force",
            run: prune_system,
        }),
        requires_confirmation: true,
    },
    ActionDefinition {
        id: "df",
        short_flag: 'D',
        long_flag: "disk-usage",
        description: "docker system df (always docker, runs once, not per project)",
        invocation: Invocation::Standalone(StandaloneOperation {
            name: "docker system df",
            run: show_disk_usage,
        }),
        requires_confirmation: false,
    },
];
