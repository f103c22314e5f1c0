use std::env;
use std::process::ExitCode;

use compose_batch_core::config::{self, ComposeSettings};
use compose_batch_core::dispatch::{DispatchOutcome, Dispatcher};
use compose_batch_core::error::Result;
use compose_batch_core::execution::SystemRunner;
use compose_batch_core::interaction::Reporter;
use compose_batch_core::registry::ActionRegistry;
use log::{debug, info};

use compose_batch_cli::cli_args::{self, RESERVED_FLAGS};
use compose_batch_cli::console::{ConsoleReporter, StdinConfirmer};
use compose_batch_cli::status;

fn execute() -> Result<DispatchOutcome> {
    let registry = ActionRegistry::builtin()?;
    registry.ensure_flags_available(RESERVED_FLAGS)?;

    let tokens: Vec<String> = env::args_os()
        .map(|token| token.to_string_lossy().into_owned())
        .collect();

    let (args, actions) = match cli_args::parse_from(&registry, &tokens) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    let config = config::load_config(&args.config_path)?;
    let root = config::get_root_directory(&args.root, &config);
    let settings = ComposeSettings::from_config(&config, &args.env_file);
    debug!("Projects root: `{}`", root.display());
    debug!("Compose prefix: {:?}", settings.prefix());

    let mut runner = SystemRunner;
    let mut confirmer = StdinConfirmer::stdin();
    let mut reporter = ConsoleReporter::stdout();
    let mut dispatcher = Dispatcher::new(root, settings, &mut runner, &mut confirmer, &mut reporter);

    if args.yes {
        info!("Pre-confirming all requested actions");
        for action in &actions {
            dispatcher.confirmations_mut().confirm(action.id);
        }
    }

    let request = args.request(actions);
    dispatcher.run(&request)
}

fn main() -> ExitCode {
    env_logger::init();

    let result = execute();
    if let Err(e) = &result {
        ConsoleReporter::stderr().error(&e.to_string());
    }

    status::exit_status(&result)
}
