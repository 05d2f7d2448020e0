use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use formedit_editor::{Batch, Document, ExecutionMode, Interpreter, OperationOutcome};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// Operation batch JSON file (an array of operations)
    pub batch: PathBuf,

    /// Output file (defaults to rewriting the document in place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Abort on the first failing operation (overrides config)
    #[arg(long)]
    pub strict: bool,

    /// Identifier seed (overrides config)
    #[arg(long)]
    pub seed: Option<String>,

    /// Print the resulting document to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;

    let mut options = config.interpreter_options();
    if args.strict {
        options.mode = ExecutionMode::Strict;
    }
    if let Some(seed) = args.seed {
        options.id_seed = Some(seed);
    }
    let interpreter = Interpreter::with_options(options);

    let mut doc = Document::load(&args.document)
        .with_context(|| format!("Cannot load document {}", args.document.display()))?
        .without_history();

    let source = fs::read_to_string(&args.batch)?;
    let batch = Batch::from_json(&source)
        .with_context(|| format!("{} is not a JSON array of operations", args.batch.display()))?;

    debug!(batch = %args.batch.display(), operations = batch.len(), mode = ?interpreter.options().mode, "batch loaded");

    let description = args.batch.display().to_string();
    let result = doc.apply_batch(&interpreter, &batch, Some(description))?;
    let json = doc.to_json(config.pretty_output)?;

    if args.stdout {
        println!("{}", json);
        eprint!("{}", result.report);
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| args.document.clone());
    fs::write(&output, json)?;

    println!(
        "{} {} operations on {}",
        "✏️".bright_blue(),
        batch.len(),
        args.document.display().to_string().bright_white()
    );
    for record in &result.report.records {
        match &record.outcome {
            OperationOutcome::Applied(applied) => {
                println!("  {} #{} {}", "✓".green(), record.index, record.operation);
                for dropped in &applied.dropped_keys {
                    println!("      {} {}", "dropped".yellow(), dropped);
                }
                for target in &applied.skipped_targets {
                    println!("      {} {}", "not found".yellow(), target);
                }
            }
            OperationOutcome::Skipped { error } => {
                println!("  {} #{} {} - {}", "✗".red(), record.index, record.operation, error);
            }
        }
    }
    for effect in &result.effects {
        println!("  {} {}", "+".cyan(), effect);
    }

    println!();
    println!(
        "{} applied, {} skipped → {}",
        result.report.applied_count().to_string().green(),
        result.report.skipped_count().to_string().red(),
        output.display()
    );

    Ok(())
}
