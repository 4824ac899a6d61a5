//! `dough` -- sourdough formula calculator CLI.
//!
//! Parses arguments with clap, loads the configuration, and dispatches to
//! the command handlers. Errors are printed to stderr with their context
//! chain and exit non-zero.

mod cli;
mod commands;
mod context;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match RuntimeContext::from_global_args(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(filter) = ctx.log_filter() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match &cli.command {
        Commands::Calc(args) => commands::calc(&ctx, args),
        Commands::Timeline(args) => commands::timeline(&ctx, args),
        Commands::Save(args) => commands::save(&ctx, args),
        Commands::List(args) => commands::list(&ctx, args),
        Commands::Show(args) => commands::show(&ctx, args),
        Commands::Delete(args) => commands::delete(&ctx, args),
        Commands::Export(args) => commands::export(&ctx, args),
        Commands::Import(args) => commands::import(&ctx, args),
        Commands::Blend { command } => commands::blend(&ctx, command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
