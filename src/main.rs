use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendify::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    let result = match cli.command {
        Commands::Setup => cli::setup::run_setup_wizard().await,
        Commands::Init => cli::commands::init().await,
        Commands::Login {
            email,
            password,
            manager,
        } => cli::commands::login(&email, password, manager).await,
        Commands::Logout => cli::commands::logout().await,
        Commands::Whoami => cli::commands::whoami().await,
        Commands::Verify => cli::commands::verify(format).await,
        Commands::Dashboard => cli::commands::dashboard(format).await,
        Commands::Register { action } => cli::commands::register(action, format).await,
        Commands::Password { action } => cli::commands::password(action).await,
        Commands::Students { action } => cli::commands::students(action, format).await,
        Commands::Batches { action } => cli::commands::batches(action, format).await,
        Commands::Subjects { action } => cli::commands::subjects(action, format).await,
        Commands::Attendance { action } => cli::commands::attendance(action, format).await,
        Commands::Institutes { action } => cli::commands::institutes(action, format).await,
        Commands::Lookups { kind } => cli::commands::lookups(kind, format).await,
    };

    if let Err(e) = &result {
        cli::error(&e.to_string());
    }
    result
}
