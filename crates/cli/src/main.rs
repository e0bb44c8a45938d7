//! Bazaar CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bazaar-cli migrate
//!
//! # Seed demo data for local development
//! bazaar-cli seed
//!
//! # Create an admin user
//! bazaar-cli admin create -e admin@example.com -n "Admin Name" -p "a long password"
//!
//! # Ban or unban a user
//! bazaar-cli user ban -e buyer@example.com
//! bazaar-cli user unban -e buyer@example.com
//!
//! # Delete expired refresh tokens
//! bazaar-cli tokens prune
//! ```
//!
//! All commands read `DATABASE_URL` from the environment (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage marketplace users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage refresh tokens
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Ban a user, locking them out at the next login or token refresh
    Ban {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Lift a user's ban
    Unban {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Delete refresh tokens past their expiry
    Prune,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Ban { email } => commands::users::set_banned(&email, true).await?,
            UserAction::Unban { email } => commands::users::set_banned(&email, false).await?,
        },
        Commands::Tokens { action } => match action {
            TokenAction::Prune => commands::tokens::prune().await?,
        },
    }
    Ok(())
}
