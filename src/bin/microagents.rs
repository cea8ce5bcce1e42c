//! Microagents CLI Binary
//!
//! Command-line interface for keyword-triggered microagent dispatch.

use anyhow::Context;
use clap::Parser;
use microagents::logging::init_logging;
use microagents::tooling::cli::{Cli, CliContext};
use std::io::IsTerminal;
use std::process;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let mut config = CliContext::load_config(&cli.workspace, cli.config.as_deref())
        .context("loading configuration")?;

    config
        .sources
        .directories
        .extend(cli.agents_dirs.iter().cloned());
    if cli.no_builtin {
        config.sources.include_builtin = false;
    }

    let level = cli.log_level.as_deref().or(cli.verbose.then_some("debug"));
    config.logging = config.logging.with_overrides(
        level,
        cli.log_format.as_deref(),
        cli.log_output.as_deref(),
        cli.log_file.clone(),
    );
    init_logging(Some(&config.logging)).context("initializing logging")?;

    let context = CliContext::from_config(cli.workspace.clone(), config)
        .context("initializing workspace")?
        .with_color(std::io::stdout().is_terminal());

    Ok(context.execute(&cli.command)?)
}
