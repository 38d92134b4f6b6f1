mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, piece::PieceSubcommand, plan::PlanArgs,
    problem::ProblemSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pieces",
    about = "Assemble tiered problem sets and keep them in order",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .pieces/)
    #[arg(long, global = true, env = "PIECES_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a pieces workspace in the current directory
    Init,

    /// Compute a tier distribution without selecting problems
    Plan(PlanArgs),

    /// Manage the problem catalog
    Problem {
        #[command(subcommand)]
        subcommand: ProblemSubcommand,
    },

    /// Manage pieces (ordered problem sets)
    Piece {
        #[command(subcommand)]
        subcommand: PieceSubcommand,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Plan(args) => cmd::plan::run(&root, args, cli.json),
        Commands::Problem { subcommand } => cmd::problem::run(&root, subcommand, cli.json),
        Commands::Piece { subcommand } => cmd::piece::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
