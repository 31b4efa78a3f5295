use crate::commands::{
    run_evidence, run_full, run_recompute, run_rules, EvidenceArgs, FullArgs, RecomputeArgs,
    RulesArgs,
};
use clap::{Parser, Subcommand};
use curriculum_rollup::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "rollup",
    about = "Recompute curriculum KPIs and status, and audit standard evidence",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute the ancestors of one changed entity
    Recompute(RecomputeArgs),
    /// Recompute every entity in a snapshot
    Full(FullArgs),
    /// Build the evidence tree for a standard and cohort
    Evidence(EvidenceArgs),
    /// Print the active status rule set
    Rules(RulesArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Recompute(args) => run_recompute(args),
        Command::Full(args) => run_full(args),
        Command::Evidence(args) => run_evidence(args),
        Command::Rules(args) => run_rules(args),
    }
}
