use clap::{Parser, Subcommand};
use pomozoo_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "pomozoo", version, about = "Pomozoo CLI")]
struct Cli {
    /// Log at debug level (overridden by POMOZOO_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Timer settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Saved work presets
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Animal collection
    Zoo {
        #[command(subcommand)]
        action: commands::zoo::ZooAction,
    },
    /// Daily statistics and checklist
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Focus guard checks
    Guard {
        #[command(subcommand)]
        action: commands::guard::GuardAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Backend sign-in
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Shared study rooms
    Room {
        #[command(subcommand)]
        action: commands::room::RoomAction,
    },
    /// Sync daily stats with the backend
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Backend profile and account deletion
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
}

fn init_tracing(verbose: bool) {
    let filter = match std::env::var("POMOZOO_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::new(v),
        _ if verbose => EnvFilter::new("debug"),
        _ => EnvFilter::try_new(AppConfig::load_or_default().logging.level)
            .unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Settings { action } => commands::settings::run(action).await,
        Commands::Preset { action } => commands::preset::run(action).await,
        Commands::Zoo { action } => commands::zoo::run(action).await,
        Commands::Stats { action } => commands::stats::run(action).await,
        Commands::Guard { action } => commands::guard::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Room { action } => commands::room::run(action).await,
        Commands::Sync { action } => commands::sync::run(action).await,
        Commands::Account { action } => commands::account::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
