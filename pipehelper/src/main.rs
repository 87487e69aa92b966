//! Transparent stdio relay that strips a trailing EOF marker (0x1A)

use anyhow::{Context, Result};
use clap::Parser;
use pipehelper_core::{
    Config, ConfigLoader, ExitOutcome, HelperArgs, Relay, RELAY_FAILURE_EXIT_CODE,
};
use std::io::IsTerminal;
use tracing_subscriber::filter::EnvFilter;

#[tokio::main(flavor = "multi_thread", worker_threads = 3)]
async fn main() {
    // Argument errors exit with the relay failure code, help and version do not
    let args = match HelperArgs::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(RELAY_FAILURE_EXIT_CODE);
        }
    };

    let config = ConfigLoader::load_or_default(args.config.as_deref());
    let verbose = args.verbose || config.as_ref().is_ok_and(|c| c.common.verbose);
    init_logging(verbose);

    let code = match run(&args, config).await {
        Ok(outcome) => outcome.code(),
        Err(e) => {
            eprintln!("pipehelper: {:#}", e);
            RELAY_FAILURE_EXIT_CODE
        }
    };

    std::process::exit(code)
}

/// Initialize logging - PIPEHELPER_LOG overrides the verbosity flag
fn init_logging(verbose: bool) {
    let filter = match std::env::var("PIPEHELPER_LOG") {
        Ok(filter) => EnvFilter::new(filter),
        Err(_) => EnvFilter::new(if verbose { "debug" } else { "error" }),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(args: &HelperArgs, config: pipehelper_core::Result<Config>) -> Result<ExitOutcome> {
    let config = config.context("Failed to load configuration")?;
    let settings = args.resolve(&config).context("Invalid relay settings")?;
    let command = args
        .command_line()
        .context("Failed to determine target command")?;

    let stdin_is_terminal = std::io::stdin().is_terminal();
    let relay_stdin = settings.stdin.should_relay(stdin_is_terminal);

    tracing::debug!("Target command: {}", command);
    tracing::debug!(
        "Buffer size: {}, stdin: {:?} (terminal: {}, relayed: {})",
        settings.buffer_capacity,
        settings.stdin,
        stdin_is_terminal,
        relay_stdin
    );

    let program = command.program().to_string();
    let input = relay_stdin.then(tokio::io::stdin);
    let outcome = Relay::new(command, input, tokio::io::stdout(), tokio::io::stderr())
        .with_buffer_capacity(settings.buffer_capacity)
        .run()
        .await
        .with_context(|| format!("Failed to run {}", program))?;

    tracing::debug!("Exiting with child exit code {}", outcome.code());
    Ok(outcome)
}
