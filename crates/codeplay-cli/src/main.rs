use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "codeplay", version, about = "CodePlay: learn to code, one level at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, log in and out
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Parent dashboard
    Parent {
        #[command(subcommand)]
        action: commands::parent::ParentAction,
    },
    /// List levels with the current kid's best scores
    Levels,
    /// Show a level's tutorial
    Tutorial {
        level: u32,
        /// Do not narrate
        #[arg(long)]
        quiet: bool,
    },
    /// Play a level
    Play {
        #[command(subcommand)]
        action: commands::play::PlayAction,
    },
    /// Screen-time status as JSON
    Time,
    /// Ask for a hint
    Hint {
        level: u32,
        question: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Account { action } => commands::account::run(action),
        Commands::Parent { action } => commands::parent::run(action),
        Commands::Levels => commands::levels::list(),
        Commands::Tutorial { level, quiet } => commands::levels::tutorial(level, quiet),
        Commands::Play { action } => commands::play::run(action),
        Commands::Time => commands::time::run(),
        Commands::Hint { level, question } => commands::hint::run(level, &question),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
