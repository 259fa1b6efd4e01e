//! Gatehouse CLI - Database migrations and account bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! gatehouse-cli migrate
//!
//! # Create the first super admin
//! gatehouse-cli user create -e admin@example.edu -p <password> -r super_admin
//!
//! # Create a department admin
//! gatehouse-cli user create -e cse@example.edu -p <password> -r department_admin -d CSE
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create staff accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gatehouse-cli")]
#[command(author, version, about = "Gatehouse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a staff account
    Create {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Role (`super_admin`, `department_admin`, `security`)
        #[arg(short, long, default_value = "security")]
        role: String,

        /// Department (required for `department_admin`)
        #[arg(short, long)]
        department: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                role,
                department,
            } => {
                commands::user::create(&email, &password, &role, department.as_deref()).await?;
            }
        },
    }
    Ok(())
}
