//! `colc` -- column-encoding pipeline configuration CLI.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

const DEBUG_FILTER: &str = "colc=debug,colcipher_core=debug,colcipher_formula=debug,\
                            colcipher_config=debug,colcipher_pipeline=debug";

fn main() {
    // First Ctrl+C: exit cleanly. Second: force exit.
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(0);
    });

    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    // Absorbed transform failures are logged at warn, so the subscriber is
    // installed unless output is quiet.
    if ctx.verbose || !ctx.quiet {
        let default = if ctx.verbose { DEBUG_FILTER } else { "warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Init(args) => commands::init::run(&ctx, &args),
        Commands::Formula(args) => commands::formula::run(&ctx, &args),
        Commands::Encode(args) => commands::codec::run_encode(&ctx, &args),
        Commands::Decode(args) => commands::codec::run_decode(&ctx, &args),
        Commands::Config(args) => commands::config_cmd::run(&ctx, &args),
        Commands::Mapping(args) => commands::mapping::run(&ctx, &args),
        Commands::Passkey(args) => commands::passkey::run(&ctx, &args),
        Commands::Run(args) => commands::run_cmd::run(&ctx, &args),
        Commands::Stats(args) => commands::stats::run(&ctx, &args),
        Commands::Version => commands::version::run(&ctx),
        Commands::Completion(args) => commands::completion::run(&ctx, &args),
    };

    if let Err(e) = result {
        if ctx.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
