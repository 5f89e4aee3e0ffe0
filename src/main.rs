mod cli;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity of the program:
    /// -v for info, -vv for debug, and -vvv for trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify interaction changes between a wild-type and a variant energy table
    Analyze(cli::analyze::Args),
    /// List the mutated positions between two structures
    Mutations(cli::mutations::Args),
    /// Report lost or gained hydrogen bonds involving buried residues
    Buried(cli::buried::Args),
    /// Pair the net interaction energy of every residue with its depth
    Depth(cli::depth::Args),
}

fn main() {
    let args = Cli::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match &args.command {
        Commands::Analyze(args) => cli::analyze::run(args),
        Commands::Mutations(args) => cli::mutations::run(args),
        Commands::Buried(args) => cli::buried::run(args),
        Commands::Depth(args) => cli::depth::run(args),
    }
}
