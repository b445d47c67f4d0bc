//! Interactive setup wizard for Attendify
//!
//! Guides users through first-time setup:
//! - backend address and reachability check
//! - session file location
//! - optional first sign-in

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::auth::{RecordingNavigator, SessionStore};
use crate::config::{self, loader::CONFIG_FILENAME, ApiConfig, Config, SessionConfig};
use crate::error::Error;

/// Run the interactive setup wizard
pub async fn run_setup_wizard() -> Result<()> {
    let theme = ColorfulTheme::default();

    print_welcome();

    let config_path = Path::new(CONFIG_FILENAME);
    if config_path.exists() {
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(format!("{} already exists. Overwrite it?", CONFIG_FILENAME))
            .default(false)
            .interact()?;

        if !overwrite {
            println!("{}", "Setup cancelled.".yellow());
            return Ok(());
        }
    }

    let config = gather_config(&theme)?;

    println!();
    let reachable = check_backend(&config).await;
    if !reachable {
        let continue_anyway = Confirm::with_theme(&theme)
            .with_prompt("The backend did not answer. Save the configuration anyway?")
            .default(false)
            .interact()?;

        if !continue_anyway {
            return Ok(());
        }
    }

    println!();
    println!("{}", "Configuration Summary".bold().underline());
    println!();
    print_config_summary(&config);

    let confirm = Confirm::with_theme(&theme)
        .with_prompt("Save this configuration?")
        .default(true)
        .interact()?;

    if !confirm {
        println!("{}", "Setup cancelled.".yellow());
        return Ok(());
    }

    config::save_config(&config, config_path)?;
    println!("{} Created {}", "✓".green(), CONFIG_FILENAME);

    println!();
    let sign_in = Confirm::with_theme(&theme)
        .with_prompt("Sign in now?")
        .default(true)
        .interact()?;

    if sign_in {
        let email: String = Input::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()?;
        let role = Select::with_theme(&theme)
            .with_prompt("Sign in as")
            .items(&["Institute", "Manager"])
            .default(0)
            .interact()?;

        crate::cli::commands::login(&email, None, role == 1).await?;
    }

    println!();
    println!("{}", "Setup complete!".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} See today's summary:", "1.".bold());
    println!("     attendify dashboard");
    println!();
    println!("  {} Record attendance:", "2.".bold());
    println!("     attendify attendance mark --batch <id> --subject <id> 12=present 13=absent");
    println!();

    Ok(())
}

fn print_welcome() {
    println!();
    println!("{}", "╔═══════════════════════════════════════════════════════════╗".cyan());
    println!("{}", "║                                                           ║".cyan());
    println!("{}", "║   Welcome to Attendify Setup                              ║".cyan());
    println!("{}", "║                                                           ║".cyan());
    println!("{}", "║   Manage students, batches and attendance for your        ║".cyan());
    println!("{}", "║   coaching institute from the terminal.                   ║".cyan());
    println!("{}", "║                                                           ║".cyan());
    println!("{}", "╚═══════════════════════════════════════════════════════════╝".cyan());
    println!();
}

fn gather_config(theme: &ColorfulTheme) -> Result<Config> {
    let defaults = Config::default();

    let base_url: String = Input::with_theme(theme)
        .with_prompt("Backend API base URL")
        .default(defaults.api.base_url.clone())
        .interact_text()?;

    let default_session = defaults.session.resolved_path().display().to_string();
    let session_path: String = Input::with_theme(theme)
        .with_prompt("Session file")
        .default(default_session.clone())
        .interact_text()?;

    let path = if session_path == default_session {
        None
    } else {
        Some(PathBuf::from(session_path))
    };

    Ok(Config {
        api: ApiConfig { base_url },
        session: SessionConfig { path },
        console: defaults.console,
    })
}

fn print_config_summary(config: &Config) {
    println!("  {} {}", "Backend:".bold(), config.api.base_url);
    println!(
        "  {} {}",
        "Session file:".bold(),
        config.session.resolved_path().display()
    );
    println!("  {} {}", "Login route:".bold(), config.console.login_route);
    println!();
}

/// Any HTTP answer counts as reachable; only transport failures do not.
///
/// Uses a throwaway session so the stored one is never touched.
async fn check_backend(config: &Config) -> bool {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Contacting {}...", config.api.base_url));

    let client = match ApiClient::from_config(
        config,
        SessionStore::in_memory(),
        Arc::new(RecordingNavigator::new()),
    ) {
        Ok(client) => client,
        Err(e) => {
            pb.finish_and_clear();
            println!("  {} {}", "✗".red(), e);
            return false;
        }
    };

    let outcome = client.master_data().class_levels().await;
    pb.finish_and_clear();

    match outcome {
        Err(Error::Transport(e)) => {
            println!("  {} Backend unreachable: {}", "✗".red(), e);
            false
        }
        _ => {
            println!("  {} Backend is answering", "✓".green());
            true
        }
    }
}
