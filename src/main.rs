//! tagjump CLI entry point

use clap::Parser;
use tagjump::cli::history::Step;
use tagjump::cli::{Cli, Commands};
use tagjump::core::error::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for results
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("TAGJUMP_LOG"))
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Find(args) => tagjump::cli::find::run(args, config),
        Commands::Search(args) => tagjump::cli::search::run(args, config),
        Commands::Header(args) => tagjump::cli::header::run(args),
        Commands::Back(args) => tagjump::cli::history::run(Step::Back, args, config),
        Commands::Forward(args) => tagjump::cli::history::run(Step::Forward, args, config),
        Commands::Current(args) => tagjump::cli::history::run(Step::Current, args, config),
        Commands::History(args) => tagjump::cli::history::list(args, config),
        Commands::Reset => tagjump::cli::history::reset(config),
    }
}
