//! Iqra Academy CLI - database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema and session-store migrations
//! iqra-cli migrate
//!
//! # Create an admin account (password from IQRA_USER_PASSWORD or --password)
//! iqra-cli user create -e admin@example.com -n "Admin Name" -r admin
//!
//! # Deactivate an account
//! iqra-cli user deactivate -e teacher@example.com
//! ```
//!
//! Every command reads the same environment as the server and requires
//! `IQRA_STORAGE=postgres`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use iqra_core::Role;

mod commands;

#[derive(Parser)]
#[command(name = "iqra-cli")]
#[command(author, version, about = "Iqra Academy CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an account of any role
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`student`, `teacher`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: Role,

        /// Initial password
        #[arg(long, env = "IQRA_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Deactivate an account so it can no longer log in
    Deactivate {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create(&email, &name, role, &password).await?;
            }
            UserAction::Deactivate { email } => commands::user::deactivate(&email).await?,
        },
    }
    Ok(())
}
