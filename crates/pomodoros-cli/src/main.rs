use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "pomodoros-cli", version, about = "Pomodoros focus timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a focus session in the foreground
    ///
    /// Events are printed as JSON lines. Type pause, resume, restart, stop,
    /// status, alarm-volume N, ambient-volume N or quit on stdin.
    Run(commands::run::RunArgs),
    /// Task definitions
    Tasks {
        #[command(subcommand)]
        action: commands::tasks::TasksAction,
    },
    /// List the sound ids a task may use
    Sounds {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Tasks { action } => commands::tasks::run(action),
        Commands::Sounds { json } => commands::sounds::run(json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
