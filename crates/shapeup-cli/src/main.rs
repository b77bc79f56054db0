mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    claim::{Claim, ClaimSubcommand},
    config::ConfigSubcommand,
    data::DataSubcommand,
    mode::ModeSubcommand,
    sprint::SprintSubcommand,
    task::TaskSubcommand,
    week::WeekSubcommand,
    year::YearSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shapeup",
    about = "Shape Up year planner: six-week sprints, cooldowns, vacation weeks and weekly tasks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Planner root holding config.yaml and the database (default: ~/.shapeup)
    #[arg(long, global = true, env = "SHAPEUP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Operate on this year (also makes it the current year)
    #[arg(long, global = true)]
    year: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show, list, switch and delete planned years
    Year {
        #[command(subcommand)]
        subcommand: YearSubcommand,
    },

    /// Inspect weeks
    Week {
        #[command(subcommand)]
        subcommand: WeekSubcommand,
    },

    /// Mark or unmark vacation weeks (at most 5 per year)
    Vacation {
        #[command(subcommand)]
        subcommand: ClaimSubcommand,
    },

    /// Mark or unmark cooldown weeks
    Cooldown {
        #[command(subcommand)]
        subcommand: ClaimSubcommand,
    },

    /// Create and manage six-week sprints
    Sprint {
        #[command(subcommand)]
        subcommand: SprintSubcommand,
    },

    /// Manage weekly tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Show or set the cycle mode
    Mode {
        #[command(subcommand)]
        subcommand: ModeSubcommand,
    },

    /// Replace the year's claims with the cycle mode's sprint pattern
    Seed,

    /// Revert the last sprint deletion, task deletion or seed
    Undo,

    /// Export, import or clear stored data
    Data {
        #[command(subcommand)]
        subcommand: DataSubcommand,
    },

    /// Show or validate the planner configuration
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
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let year = cli.year;

    let result = match cli.command {
        Commands::Year { subcommand } => cmd::year::run(&root, subcommand, year, cli.json),
        Commands::Week { subcommand } => cmd::week::run(&root, subcommand, year, cli.json),
        Commands::Vacation { subcommand } => {
            cmd::claim::run(&root, Claim::Vacation, subcommand, cli.json)
        }
        Commands::Cooldown { subcommand } => {
            cmd::claim::run(&root, Claim::Cooldown, subcommand, cli.json)
        }
        Commands::Sprint { subcommand } => cmd::sprint::run(&root, subcommand, year, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Mode { subcommand } => cmd::mode::run(&root, subcommand, cli.json),
        Commands::Seed => cmd::plan::seed(&root, year, cli.json),
        Commands::Undo => cmd::plan::undo(&root, year, cli.json),
        Commands::Data { subcommand } => cmd::data::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
