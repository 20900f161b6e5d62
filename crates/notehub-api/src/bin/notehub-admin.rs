//! notehub-admin: maintenance commands for a NoteHub deployment.
//!
//! Reads `DATABASE_URL` from the environment (or `.env`) unless `--database-url`
//! is given.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use notehub_api::services::CourseService;
use notehub_core::defaults::DATABASE_URL;
use notehub_db::{Database, UserRepository};

#[derive(Parser)]
#[command(name = "notehub-admin")]
#[command(author, version, about = "Maintenance commands for NoteHub")]
#[command(propagate_version = true)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", default_value = DATABASE_URL, global = true)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Insert the default course list (existing names are left alone)
    SeedCourses,

    /// Print every registered user
    ListUsers,

    /// Check that the database is reachable
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = notehub_api::telemetry::init_tracing("notehub_db=info,warn");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db = Database::connect(&cli.database_url).await?;

    match cli.command {
        Commands::Migrate => {
            db.migrate().await?;
            println!("Migrations applied");
        }
        Commands::SeedCourses => {
            let created = CourseService::new(db).seed_defaults().await?;
            println!("Seeded {} new course(s)", created);
        }
        Commands::ListUsers => {
            let users = db.users.list_all().await?;
            for user in &users {
                println!(
                    "{}\t{}\t{}",
                    user.id,
                    user.email,
                    user.created_at.to_rfc3339()
                );
            }
            println!("{} user(s)", users.len());
        }
        Commands::Check => {
            db.ping().await?;
            println!("Database reachable");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::try_parse_from(["notehub-admin", "seed-courses"]).unwrap();
        assert!(matches!(cli.command, Commands::SeedCourses));

        let cli = Cli::try_parse_from([
            "notehub-admin",
            "list-users",
            "--database-url",
            "postgres://x/y",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::ListUsers));
        assert_eq!(cli.database_url, "postgres://x/y");

        assert!(Cli::try_parse_from(["notehub-admin", "drop-everything"]).is_err());
    }
}
