use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tether::ContextConfig;
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod config;
mod globals;

use commands::{eval::EvalCommand, repl::ReplCommand, run::RunCommand};

#[derive(Parser)]
#[command(name = "tether", version, about = "Run JavaScript against native objects")]
struct Cli {
    /// Path to a tether.toml (searched upward from the current directory by default)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum iterations of a single loop
    #[arg(long, global = true)]
    loop_limit: Option<u64>,

    /// Maximum call recursion depth
    #[arg(long, global = true)]
    recursion_limit: Option<usize>,

    /// Maximum engine stack size
    #[arg(long, global = true)]
    stack_limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script file
    Run(RunCommand),
    /// Evaluate a snippet and print the result
    Eval(EvalCommand),
    /// Start an interactive shell
    Repl(ReplCommand),
}

impl Cli {
    fn flag_overrides(&self) -> ContextConfig {
        ContextConfig {
            loop_iteration_limit: self.loop_limit,
            recursion_limit: self.recursion_limit,
            stack_size_limit: self.stack_limit,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    let context_config = config.context.merge(&cli.flag_overrides());

    match &cli.command {
        Commands::Run(cmd) => cmd.run(context_config)?,
        Commands::Eval(cmd) => cmd.run(context_config)?,
        Commands::Repl(cmd) => cmd.run(context_config)?,
    }

    Ok(())
}
