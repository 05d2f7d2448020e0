mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, init, tree, ApplyArgs, InitArgs, TreeArgs};

/// Formedit CLI - apply planner edit batches to form-schema documents
#[derive(Parser, Debug)]
#[command(name = "formedit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every operation (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default formedit.config.json
    Init(InitArgs),

    /// Apply an operation batch to a document
    Apply(ApplyArgs),

    /// Print the outline of a document
    Tree(TreeArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Apply(args) => apply(args, &cwd),
                Command::Tree(args) => tree(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
