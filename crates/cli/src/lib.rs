pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "omegapick",
    about = "Omega-3 comparison operator CLI",
    long_about = "Inspect the product catalog, run comparisons offline or against the configured \
                  language model, and inspect effective configuration.",
    after_help = "Examples:\n  omegapick products\n  omegapick compare --product-a \"Sports Research\" \
                  --product-b \"NOW Foods\" --age 40 --gender male --offline\n  omegapick config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List every catalog product with its derived metrics as JSON")]
    Products,
    #[command(about = "Compare two catalog products for a user profile and print the response")]
    Compare(CompareArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    #[arg(long, help = "First catalog key (wins score ties)")]
    pub product_a: String,
    #[arg(long, help = "Second catalog key")]
    pub product_b: String,
    #[arg(long, default_value_t = 0)]
    pub age: u32,
    #[arg(long, default_value = "")]
    pub gender: String,
    #[arg(long)]
    pub meds: Option<String>,
    #[arg(long)]
    pub concerns: Option<String>,
    #[arg(long)]
    pub budget: Option<String>,
    #[arg(long)]
    pub current_supplements: Option<String>,
    #[arg(long, help = "Skip the language model and use the deterministic recommendation")]
    pub offline: bool,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Products => commands::products::run(),
        Command::Compare(args) => commands::compare::run(args),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
