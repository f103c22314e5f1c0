//! Integration tests for compose-batch-core
//!
//! These tests drive complete runs through the dispatcher, from the requested
//! action flags to the recorded invocations, over real project trees
//! in temporary directories.

use std::collections::{HashSet, VecDeque};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use compose_batch_core::{
    action_definitions::{ActionDefinition, Invocation, StandaloneOperation},
    config::{ComposeSettings, IGNORE_MARKER},
    dispatch::{DispatchOutcome, DispatchRequest, DispatchSummary, Dispatcher, TargetSelection},
    error::{Error, Result},
    execution::CommandRunner,
    interaction::{Confirmer, ReportLevel, Reporter},
    registry::ActionRegistry,
    sequencing::sequence,
};
use tempfile::TempDir;

/// Records every invocation instead of running it. Invocations listed in
/// `failing` ("project:subcommand") fail with a non-zero exit.
#[derive(Default)]
struct RecordingRunner {
    calls: Vec<String>,
    directories: Vec<PathBuf>,
    failing: HashSet<String>,
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, arguments: &[String], working_directory: &Path) -> Result<()> {
        let project = working_directory
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let call = format!("{project}:{}", arguments[4..].join(" "));

        self.calls.push(call.clone());
        self.directories.push(working_directory.to_path_buf());

        if self.failing.contains(&call) {
            Err(Error::SubProcessExit { code: Some(1) })
        } else {
            Ok(())
        }
    }

    fn run_standalone(&mut self, operation: &StandaloneOperation) -> Result<()> {
        self.calls.push(format!("standalone:{}", operation.name));
        Ok(())
    }
}

struct ScriptedConfirmer {
    answers: VecDeque<bool>,
    questions: Vec<String>,
}

impl ScriptedConfirmer {
    fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            questions: Vec::new(),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        self.questions.push(message.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

#[derive(Default)]
struct RecordingReporter {
    messages: Vec<(ReportLevel, String)>,
}

impl RecordingReporter {
    fn contains(&self, level: ReportLevel, text: &str) -> bool {
        self.messages
            .iter()
            .any(|(l, message)| *l == level && message.contains(text))
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, level: ReportLevel, message: &str) {
        self.messages.push((level, message.to_string()));
    }
}

fn projects_root(projects: &[&str]) -> TempDir {
    let root = TempDir::new().unwrap();
    for project in projects {
        fs::create_dir(root.path().join(project)).unwrap();
    }
    root
}

/// Sequences the actions behind `tokens`, using each token's index as the
/// position a parser would report. Tokens that aren't action flags are skipped.
fn requested<'r>(registry: &'r ActionRegistry, tokens: &[&str]) -> Vec<&'r ActionDefinition> {
    let occurrences = tokens.iter().enumerate().filter_map(|(index, token)| {
        registry
            .find_by_flag(token)
            .map(|action| (action.id, index))
    });
    sequence(occurrences, registry)
}

fn named(projects: &[&str]) -> TargetSelection {
    TargetSelection::Named(projects.iter().map(ToString::to_string).collect())
}

struct Harness {
    runner: RecordingRunner,
    confirmer: ScriptedConfirmer,
    reporter: RecordingReporter,
}

impl Harness {
    fn new(answers: &[bool]) -> Self {
        Self {
            runner: RecordingRunner::default(),
            confirmer: ScriptedConfirmer::answering(answers),
            reporter: RecordingReporter::default(),
        }
    }

    fn run(&mut self, root: &Path, request: &DispatchRequest<'_>) -> Result<DispatchOutcome> {
        Dispatcher::new(
            root.to_path_buf(),
            ComposeSettings::default(),
            &mut self.runner,
            &mut self.confirmer,
            &mut self.reporter,
        )
        .run(request)
    }
}

fn completed(outcome: DispatchOutcome) -> DispatchSummary {
    match outcome {
        DispatchOutcome::Completed(summary) => summary,
        other => panic!("Expected a completed run, got {other:?}"),
    }
}

/// Flag order on the command line decides execution order
#[test]
fn test_actions_run_in_command_line_order() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web", "db"]);
    let mut harness = Harness::new(&[]);

    let tokens = ["cb", "-u", "--pull", "-b", "-p", "web", "db"];
    let request = DispatchRequest {
        list: false,
        actions: requested(&registry, &tokens),
        targets: named(&["web", "db"]),
        dry_run: false,
    };

    let summary = completed(harness.run(root.path(), &request).unwrap());

    assert_eq!(summary.executed, 6);
    assert_eq!(
        harness.runner.calls,
        vec![
            "web:up -d --force-recreate",
            "db:up -d --force-recreate",
            "web:pull",
            "db:pull",
            "web:build",
            "db:build",
        ]
    );
}

#[test]
fn test_invocations_run_inside_project_directory() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web"]);
    let mut harness = Harness::new(&[]);

    let request = DispatchRequest {
        list: false,
        actions: vec![registry.lookup("--pull").unwrap()],
        targets: named(&["web"]),
        dry_run: false,
    };
    harness.run(root.path(), &request).unwrap();

    assert_eq!(harness.runner.directories, vec![root.path().join("web")]);
}

/// Ignored projects are skipped by every per-project action but still listed
#[test]
fn test_ignored_project_is_skipped_but_listed() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web", "db"]);
    File::create(root.path().join("db").join(IGNORE_MARKER)).unwrap();
    let mut harness = Harness::new(&[]);

    let request = DispatchRequest {
        list: false,
        actions: requested(&registry, &["-p", "-s"]),
        targets: TargetSelection::All,
        dry_run: false,
    };
    let summary = completed(harness.run(root.path(), &request).unwrap());

    assert_eq!(summary.skipped, 2);
    assert_eq!(harness.runner.calls, vec!["web:pull", "web:stop"]);

    let listing = DispatchRequest {
        list: true,
        actions: Vec::new(),
        targets: TargetSelection::All,
        dry_run: false,
    };
    match harness.run(root.path(), &listing).unwrap() {
        DispatchOutcome::Listed(projects) => {
            let db = projects.iter().find(|p| p.name == "db").unwrap();
            assert!(db.ignored);
            assert_eq!(projects.len(), 2);
        }
        other => panic!("Expected a listing, got {other:?}"),
    }
    assert!(harness.reporter.contains(ReportLevel::Warning, "db (ignored)"));
}

/// Listing takes precedence over any requested action
#[test]
fn test_listing_does_not_dispatch() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web"]);
    let mut harness = Harness::new(&[]);

    let request = DispatchRequest {
        list: true,
        actions: requested(&registry, &["-d", "-P"]),
        targets: TargetSelection::All,
        dry_run: false,
    };
    let outcome = harness.run(root.path(), &request).unwrap();

    assert!(matches!(outcome, DispatchOutcome::Listed(_)));
    assert!(harness.runner.calls.is_empty());
    assert!(harness.confirmer.questions.is_empty());
}

/// Dry runs never invoke anything and never prompt
#[test]
fn test_dry_run_reports_without_running_or_prompting() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web", "db"]);
    let mut harness = Harness::new(&[true, true]);

    let request = DispatchRequest {
        list: false,
        actions: requested(&registry, &["--down", "--prune", "--pull"]),
        targets: named(&["web", "db"]),
        dry_run: true,
    };
    let summary = completed(harness.run(root.path(), &request).unwrap());

    assert!(harness.runner.calls.is_empty());
    assert!(harness.confirmer.questions.is_empty());
    assert_eq!(summary.dry_run, 5);
    assert_eq!(summary.executed, 0);
    assert!(harness.reporter.contains(
        ReportLevel::Info,
        "[DRY] -> web: docker compose --env-file ../secret.env down"
    ));
    assert!(harness
        .reporter
        .contains(ReportLevel::Info, "[DRY] -> docker system prune --force"));
}

/// One confirmation per destructive action per process
#[test]
fn test_confirmation_is_asked_once_per_action() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web", "db"]);
    let mut runner = RecordingRunner::default();
    let mut confirmer = ScriptedConfirmer::answering(&[true]);
    let mut reporter = RecordingReporter::default();

    let mut dispatcher = Dispatcher::new(
        root.path().to_path_buf(),
        ComposeSettings::default(),
        &mut runner,
        &mut confirmer,
        &mut reporter,
    );
    let request = DispatchRequest {
        list: false,
        actions: vec![registry.lookup("-d").unwrap()],
        targets: named(&["web", "db"]),
        dry_run: false,
    };

    dispatcher.run(&request).unwrap();
    // Same process, same dispatcher: still no second prompt
    dispatcher.run(&request).unwrap();
    drop(dispatcher);

    assert_eq!(confirmer.questions, vec!["Run `down` on web?"]);
    assert_eq!(runner.calls, vec!["web:down", "db:down", "web:down", "db:down"]);
}

/// The prompt appears at the first attempted use, not before earlier actions
#[test]
fn test_confirmation_is_asked_at_first_use() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web"]);

    struct Recorder<'a> {
        inner: RecordingRunner,
        log: &'a std::cell::RefCell<Vec<String>>,
    }
    impl CommandRunner for Recorder<'_> {
        fn run(&mut self, arguments: &[String], working_directory: &Path) -> Result<()> {
            self.log.borrow_mut().push(format!("run {}", arguments[4]));
            self.inner.run(arguments, working_directory)
        }
    }
    struct AskRecorder<'a> {
        log: &'a std::cell::RefCell<Vec<String>>,
    }
    impl Confirmer for AskRecorder<'_> {
        fn confirm(&mut self, message: &str) -> Result<bool> {
            self.log.borrow_mut().push(format!("ask {message}"));
            Ok(true)
        }
    }

    let log = std::cell::RefCell::new(Vec::new());
    let mut runner = Recorder {
        inner: RecordingRunner::default(),
        log: &log,
    };
    let mut confirmer = AskRecorder { log: &log };
    let mut reporter = RecordingReporter::default();

    Dispatcher::new(
        root.path().to_path_buf(),
        ComposeSettings::default(),
        &mut runner,
        &mut confirmer,
        &mut reporter,
    )
    .run(&DispatchRequest {
        list: false,
        actions: requested(&registry, &["-p", "-d"]),
        targets: named(&["web"]),
        dry_run: false,
    })
    .unwrap();
    drop(runner);
    drop(confirmer);

    assert_eq!(
        log.into_inner(),
        vec!["run pull", "ask Run `down` on web?", "run down"]
    );
}

/// A failure for one target doesn't stop other targets or actions
#[test]
fn test_failure_does_not_stop_the_batch() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["p1", "p2"]);
    let mut harness = Harness::new(&[]);
    harness.runner.failing.insert("p1:pull".to_string());

    let request = DispatchRequest {
        list: false,
        actions: requested(&registry, &["-p", "-b"]),
        targets: named(&["p1", "p2"]),
        dry_run: false,
    };
    let summary = completed(harness.run(root.path(), &request).unwrap());

    assert_eq!(
        harness.runner.calls,
        vec!["p1:pull", "p2:pull", "p1:build", "p2:build"]
    );
    assert_eq!(summary.executed, 3);
    assert!(summary.has_failures());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].action, "pull");
    assert_eq!(summary.failures[0].project, Some("p1".to_string()));
    assert!(harness.reporter.contains(ReportLevel::Error, "p1: `pull` failed"));
}

/// Standalone-only batches need no projects
#[test]
fn test_standalone_only_batch_runs_without_projects() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web"]);
    let mut harness = Harness::new(&[]);

    let request = DispatchRequest {
        list: false,
        actions: requested(&registry, &["--disk-usage"]),
        targets: named(&[]),
        dry_run: false,
    };
    let summary = completed(harness.run(root.path(), &request).unwrap());

    assert_eq!(summary.executed, 1);
    assert_eq!(harness.runner.calls, vec!["standalone:docker system df"]);
}

/// Standalone actions run once, no matter how many projects are selected
#[test]
fn test_standalone_runs_once_with_projects() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web", "db"]);
    let mut harness = Harness::new(&[true]);

    let request = DispatchRequest {
        list: false,
        actions: requested(&registry, &["-P", "-p"]),
        targets: TargetSelection::All,
        dry_run: false,
    };
    completed(harness.run(root.path(), &request).unwrap());

    assert_eq!(
        harness.runner.calls,
        vec!["standalone:docker system prune --force", "db:pull", "web:pull"]
    );
    assert_eq!(harness.confirmer.questions, vec!["Run `prune`?"]);
}

/// A per-project action without projects fails before anything runs
#[test]
fn test_per_project_action_without_projects_fails_early() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&["web"]);
    let mut harness = Harness::new(&[true]);

    let request = DispatchRequest {
        list: false,
        actions: requested(&registry, &["-P", "-p"]),
        targets: named(&["missing"]),
        dry_run: false,
    };
    let result = harness.run(root.path(), &request);

    assert!(matches!(result, Err(Error::NoValidTargets)));
    assert!(harness.runner.calls.is_empty());
    assert!(harness.confirmer.questions.is_empty());
    assert!(harness.reporter.contains(ReportLevel::Warning, "`missing` not found"));
}

#[test]
fn test_all_with_empty_root_fails_for_per_project_actions() {
    let registry = ActionRegistry::builtin().unwrap();
    let root = projects_root(&[]);
    let mut harness = Harness::new(&[]);

    let request = DispatchRequest {
        list: false,
        actions: vec![registry.lookup("--up").unwrap()],
        targets: TargetSelection::All,
        dry_run: false,
    };

    assert!(matches!(
        harness.run(root.path(), &request),
        Err(Error::NoValidTargets)
    ));
}

/// Ignored-ness is read at dispatch time, not when the run starts
#[test]
fn test_ignore_marker_is_read_fresh() {
    let root = projects_root(&["web"]);
    let marker = root.path().join("web").join(IGNORE_MARKER);

    fn nothing() -> Result<()> {
        Ok(())
    }

    struct MarkerRunner {
        marker: PathBuf,
        calls: Vec<String>,
    }
    impl CommandRunner for MarkerRunner {
        fn run(&mut self, arguments: &[String], _working_directory: &Path) -> Result<()> {
            self.calls.push(arguments[4].clone());
            File::create(&self.marker).map_err(Error::SubProcess)?;
            Ok(())
        }
    }

    let first = ActionDefinition {
        id: "first",
        short_flag: 'f',
        long_flag: "first",
        description: "creates the marker",
        invocation: Invocation::Compose(&["first"]),
        requires_confirmation: false,
    };
    let second = ActionDefinition {
        id: "second",
        short_flag: 's',
        long_flag: "second",
        description: "should be skipped",
        invocation: Invocation::Compose(&["second"]),
        requires_confirmation: false,
    };
    let noop = ActionDefinition {
        id: "noop",
        short_flag: 'n',
        long_flag: "noop",
        description: "standalone",
        invocation: Invocation::Standalone(StandaloneOperation {
            name: "noop",
            run: nothing,
        }),
        requires_confirmation: false,
    };
    let registry = ActionRegistry::new(vec![first, second, noop]).unwrap();

    let mut runner = MarkerRunner {
        marker,
        calls: Vec::new(),
    };
    let mut confirmer = ScriptedConfirmer::answering(&[]);
    let mut reporter = RecordingReporter::default();

    let summary = completed(
        Dispatcher::new(
            root.path().to_path_buf(),
            ComposeSettings::default(),
            &mut runner,
            &mut confirmer,
            &mut reporter,
        )
        .run(&DispatchRequest {
            list: false,
            actions: requested(&registry, &["-f", "-n", "-s"]),
            targets: named(&["web"]),
            dry_run: false,
        })
        .unwrap(),
    );

    assert_eq!(runner.calls, vec!["first"]);
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.skipped, 1);
}
