//! # CRM CLI
//!
//! Command-line interface for the CRM backend.
//!
//! ## Usage
//!
//! ```bash
//! crm serve                 # Start the API server (runs migrations automatically)
//! crm migrate               # Apply pending migrations
//! crm migrate --rollback 1  # Undo the last migration
//! crm create-admin --email admin@example.com --username admin
//! crm --help                # Show help
//! ```

mod commands;
mod config;
mod server;
mod tls;

use clap::{CommandFactory as _, Parser};
use error::{AppError, Result};
use tracing::info;

use crate::{
    commands::{admin, completions, migrate, seed, validate, Commands},
    config::DatabaseConfig,
};

/// CRM backend - customers, leads, deals and the work around them
#[derive(Parser, Debug)]
#[command(name = "crm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level or filter directive (debug, info, warn, error)
    #[arg(short = 'L', long, env = "RUST_LOG", default_value = "info", global = true)]
    log_level: String,

    /// Output format (json, pretty, compact)
    #[arg(short, long, env = "CRM_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: String,

    /// Also write logs to this file, rotated daily
    #[arg(long, env = "CRM_LOG_FILE", global = true)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = logging::init(&cli.log_level, &cli.log_format, cli.log_file.as_deref())
        .map_err(|e| AppError::internal(format!("Failed to initialize logging: {}", e)))?;

    info!(target: "app", command = cli.command.name(), "CRM CLI starting...");

    match cli.command {
        Commands::Serve(args) => {
            let database = DatabaseConfig::from_env().map_err(AppError::config)?;
            server::serve(&database, &args).await?;
        },
        Commands::Migrate(args) => {
            let database = DatabaseConfig::from_env().map_err(AppError::config)?;
            migrate::migrate(&database, &args).await?;
        },
        Commands::Seed => {
            let database = DatabaseConfig::from_env().map_err(AppError::config)?;
            let db = migrate::connect(&database).await?;
            seed::seed(&db).await?;
        },
        Commands::CreateAdmin(args) => {
            let database = DatabaseConfig::from_env().map_err(AppError::config)?;
            let db = migrate::connect(&database).await?;
            admin::create_admin(&db, args).await?;
        },
        Commands::Validate => validate::validate().await?,
        Commands::Completions(args) => completions::completions(args.shell, &mut Cli::command())?,
    }

    info!(target: "app", "CRM CLI completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_command_factory() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "crm");
        cmd.debug_assert();
    }

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::parse_from(["crm", "serve"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host, "127.0.0.1");
                assert_eq!(args.port, 8000);
                assert!(!args.tls);
                assert!(!args.skip_migrations);
            },
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_tls_requires_paths() {
        assert!(Cli::try_parse_from(["crm", "serve", "--tls"]).is_err());

        let cli = Cli::parse_from([
            "crm",
            "serve",
            "--tls",
            "--tls-cert",
            "/etc/crm/cert.pem",
            "--tls-key",
            "/etc/crm/key.pem",
        ]);
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.tls);
                assert_eq!(args.tls_cert.as_deref(), Some("/etc/crm/cert.pem"));
            },
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_migrate_rollback_steps() {
        let cli = Cli::parse_from(["crm", "migrate", "--rollback", "2"]);
        match cli.command {
            Commands::Migrate(args) => {
                assert_eq!(args.rollback, Some(2));
                assert!(!args.dry_run);
            },
            _ => panic!("Expected Migrate command"),
        }
    }

    #[test]
    fn test_migrate_dry_run_conflicts_with_rollback() {
        assert!(Cli::try_parse_from(["crm", "migrate", "--dry-run", "--rollback", "1"]).is_err());
    }

    #[test]
    fn test_create_admin_args() {
        let cli = Cli::parse_from([
            "crm",
            "create-admin",
            "--email",
            "root@example.com",
            "--username",
            "root",
            "--password",
            "Velvet-Harbor-42",
        ]);
        match cli.command {
            Commands::CreateAdmin(args) => {
                assert_eq!(args.email, "root@example.com");
                assert_eq!(args.username, "root");
            },
            _ => panic!("Expected CreateAdmin command"),
        }
    }

    #[test]
    fn test_global_log_flags_after_subcommand() {
        let cli = Cli::parse_from(["crm", "validate", "--log-format", "json"]);
        assert!(matches!(cli.command, Commands::Validate));
        assert_eq!(cli.log_format, "json");
    }

    #[test]
    fn test_completions_shell() {
        let cli = Cli::parse_from(["crm", "completions", "bash"]);
        match cli.command {
            Commands::Completions(args) => assert_eq!(args.shell, clap_complete::Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }
}
