//! Operator commands: schema migrations and staff account provisioning.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use migration::MigratorTrait;
use models::UserRole;
use service::auth::domain::NewAccount;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "manage", about = "TechVerse administration commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct AccountArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply all pending migrations.
    Migrate,
    /// Create an active technician account.
    CreateTechnician(AccountArgs),
    /// Create an admin account with staff access.
    CreateAdmin(AccountArgs),
}

async fn create_account(role: UserRole, args: AccountArgs) -> anyhow::Result<()> {
    let db = models::db::connect().await?;
    // the CLI never issues tokens, so the signing secret is irrelevant here
    let auth = AuthService::new(Arc::new(SeaOrmAuthRepository { db }), AuthConfig::new(String::new(), 60, 7));
    let created = auth
        .create_account(NewAccount {
            email: args.email,
            name: args.name,
            password: Some(args.password),
            phone: args.phone,
            role,
            is_staff: role == UserRole::Admin,
        })
        .await?;
    info!(user_id = %created.id, email = %created.email, role = role.as_str(), "account created");
    println!("created {} {} ({})", role.as_str().to_lowercase(), created.email, created.id);
    Ok(())
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Migrate => {
            let db = models::db::connect().await?;
            migration::Migrator::up(&db, None).await?;
            info!(event = "migrated", "migrations applied");
            Ok(())
        }
        Commands::CreateTechnician(args) => create_account(UserRole::Technician, args).await,
        Commands::CreateAdmin(args) => create_account(UserRole::Admin, args).await,
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_default();
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
