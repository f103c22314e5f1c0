//! The action dispatch engine.
//!
//! A run moves through `Start -> {Listing | NothingToDo | Dispatching} -> Done`.
//! Dispatching walks the requested actions in order; standalone actions run
//! once, every other action runs once per selected project. Everything runs
//! sequentially on the calling thread and each external process is awaited
//! before the next one starts.
//!
//! Failures of single invocations are reported and recorded in the
//! [`DispatchSummary`] but never stop the batch. Only a selection problem
//! (no projects for an action that needs them) ends a run early.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use itertools::Itertools;
use log::{debug, warn};

use crate::action_definitions::{ActionDefinition, Invocation};
use crate::config::{ComposeSettings, IGNORE_MARKER};
use crate::error::{Error, Result};
use crate::execution::CommandRunner;
use crate::interaction::{Confirmer, Reporter};
use crate::projects::{self, ProjectListing};

/// Which projects the per-project actions apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    All,
    Named(Vec<String>),
}

/// Everything a single run needs to know.
#[derive(Debug, Clone)]
pub struct DispatchRequest<'r> {
    /// List the projects and stop.
    pub list: bool,
    /// Already sequenced and deduplicated.
    pub actions: Vec<&'r ActionDefinition>,
    pub targets: TargetSelection,
    pub dry_run: bool,
}

/// How a run ended.
#[derive(Debug)]
pub enum DispatchOutcome {
    Listed(Vec<ProjectListing>),
    NothingToDo,
    Completed(DispatchSummary),
}

/// Which actions the user has already said "yes" to.
///
/// Lives as long as the [`Dispatcher`] that owns it; entries are only ever
/// added, so each action is confirmed at most once.
#[derive(Debug, Default, Clone)]
pub struct ConfirmationCache {
    confirmed: HashMap<String, bool>,
}

impl ConfirmationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_confirmed(&self, action_id: &str) -> bool {
        self.confirmed.get(action_id).copied().unwrap_or(false)
    }

    pub fn confirm(&mut self, action_id: &str) {
        self.confirmed.insert(action_id.to_string(), true);
    }
}

/// One failed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub action: String,
    /// `None` for standalone actions.
    pub project: Option<String>,
    pub message: String,
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{} ({}): {}", self.action, project, self.message),
            None => write!(f, "{}: {}", self.action, self.message),
        }
    }
}

/// Tally of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub executed: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub failures: Vec<Failure>,
}

impl DispatchSummary {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs dispatch requests against a projects root.
pub struct Dispatcher<'a> {
    root: PathBuf,
    settings: ComposeSettings,
    runner: &'a mut dyn CommandRunner,
    confirmer: &'a mut dyn Confirmer,
    reporter: &'a mut dyn Reporter,
    confirmations: ConfirmationCache,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        root: PathBuf,
        settings: ComposeSettings,
        runner: &'a mut dyn CommandRunner,
        confirmer: &'a mut dyn Confirmer,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            root,
            settings,
            runner,
            confirmer,
            reporter,
            confirmations: ConfirmationCache::new(),
        }
    }

    #[must_use]
    pub fn confirmations(&self) -> &ConfirmationCache {
        &self.confirmations
    }

    /// Used to pre-confirm actions, e.g. for `--yes`.
    pub fn confirmations_mut(&mut self) -> &mut ConfirmationCache {
        &mut self.confirmations
    }

    /// Carries out one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the projects root cannot be read, or
    /// [`Error::NoValidTargets`] if a per-project action was requested without
    /// any project to run it on. Failed invocations are not errors here; they
    /// end up in the [`DispatchSummary`].
    pub fn run(&mut self, request: &DispatchRequest<'_>) -> Result<DispatchOutcome> {
        debug!(
            "Dispatching {:?} on {:?} (dry run: {})",
            request.actions.iter().map(|a| a.id).collect_vec(),
            request.targets,
            request.dry_run
        );

        if request.list {
            return Ok(DispatchOutcome::Listed(self.list_projects()?));
        }

        if request.actions.is_empty() {
            self.reporter.warning("No actions specified, nothing to do");
            return Ok(DispatchOutcome::NothingToDo);
        }

        let targets = self.resolve_targets(&request.targets)?;
        let needs_projects = request.actions.iter().any(|action| !action.is_standalone());

        if targets.is_empty() && needs_projects {
            return Err(Error::NoValidTargets);
        }

        if needs_projects {
            self.reporter
                .success(&format!("Projects: {}", targets.iter().join(", ")));
        }
        self.reporter.success(&format!(
            "Actions: {}",
            request.actions.iter().map(|a| a.id).join(", ")
        ));

        let mut summary = DispatchSummary::default();

        for action in &request.actions {
            self.reporter.info(&format!("\n=== Action: {}", action.id));

            if action.is_standalone() {
                self.attempt(action, None, request.dry_run, &mut summary);
                continue;
            }

            for project in &targets {
                // Checked on every pass, an earlier action may have changed it
                if projects::is_ignored(project, &self.root) {
                    self.reporter.warning(&format!(
                        "-> {project}: skipping ({IGNORE_MARKER} file present)"
                    ));
                    summary.skipped += 1;
                    continue;
                }

                self.attempt(action, Some(project.as_str()), request.dry_run, &mut summary);
            }
        }

        self.report_completion(&summary);
        Ok(DispatchOutcome::Completed(summary))
    }

    fn list_projects(&mut self) -> Result<Vec<ProjectListing>> {
        let listing = projects::list(&self.root)?;

        self.reporter.info("Available projects:");
        for project in &listing {
            if project.ignored {
                self.reporter
                    .warning(&format!("- {} (ignored)", project.name));
            } else {
                self.reporter.info(&format!("- {}", project.name));
            }
        }

        Ok(listing)
    }

    fn resolve_targets(&mut self, selection: &TargetSelection) -> Result<Vec<String>> {
        match selection {
            TargetSelection::All => {
                let mut all_projects = projects::discover(&self.root)?;
                all_projects.sort();
                self.reporter.success("Targeting all available projects");
                Ok(all_projects)
            }
            TargetSelection::Named(names) if names.is_empty() => Ok(Vec::new()),
            TargetSelection::Named(names) => {
                let all_projects = projects::discover(&self.root)?;
                let (valid, missing) = projects::resolve(names, &all_projects);

                for name in &missing {
                    let message = match projects::suggest(name, &all_projects) {
                        Some(suggestion) => format!(
                            "Project `{name}` not found, skipping (did you mean `{suggestion}`?)"
                        ),
                        None => format!("Project `{name}` not found, skipping"),
                    };
                    self.reporter.warning(&message);
                }

                Ok(valid)
            }
        }
    }

    /// Asks for confirmation if the action needs it and hasn't been confirmed
    /// yet. Returns whether the execution may go ahead.
    fn confirmed(&mut self, action: &ActionDefinition, project: Option<&str>) -> bool {
        if !action.requires_confirmation || self.confirmations.is_confirmed(action.id) {
            return true;
        }

        let question = match project {
            Some(project) => format!("Run `{}` on {project}?", action.id),
            None => format!("Run `{}`?", action.id),
        };

        match self.confirmer.confirm(&question) {
            Ok(true) => {
                self.confirmations.confirm(action.id);
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!("Could not read confirmation for `{}`: {e}", action.id);
                self.reporter
                    .warning(&format!("Could not read an answer: {e}"));
                false
            }
        }
    }

    fn attempt(
        &mut self,
        action: &ActionDefinition,
        project: Option<&str>,
        dry_run: bool,
        summary: &mut DispatchSummary,
    ) {
        let label = project.map_or_else(String::new, |project| format!("{project}: "));
        let invocation = action.display_invocation(&self.settings);

        if dry_run {
            self.reporter
                .info(&format!("[DRY] -> {label}{invocation}"));
            summary.dry_run += 1;
            return;
        }

        if !self.confirmed(action, project) {
            self.reporter
                .info(&format!("-> {label}`{}` cancelled", action.id));
            summary.cancelled += 1;
            return;
        }

        self.reporter.info(&format!("-> {label}{invocation}"));

        let result = match action.invocation {
            Invocation::Standalone(operation) => self.runner.run_standalone(&operation),
            Invocation::Compose(_) => {
                let working_directory =
                    project.map_or_else(|| self.root.clone(), |project| self.root.join(project));
                let command_line = action.command_line(&self.settings).unwrap_or_default();
                self.runner.run(&command_line, &working_directory)
            }
        };

        match result {
            Ok(()) => summary.executed += 1,
            Err(e) => {
                self.reporter
                    .error(&format!("-> {label}`{}` failed: {e}", action.id));
                summary.failures.push(Failure {
                    action: action.id.to_string(),
                    project: project.map(ToString::to_string),
                    message: e.to_string(),
                });
            }
        }
    }

    fn report_completion(&mut self, summary: &DispatchSummary) {
        if summary.has_failures() {
            self.reporter.error(&format!(
                "\nDone with {} failed invocation(s):",
                summary.failures.len()
            ));
            for failure in &summary.failures {
                self.reporter.error(&format!("- {failure}"));
            }
        } else {
            self.reporter.success("\nDone");
        }
    }
}
