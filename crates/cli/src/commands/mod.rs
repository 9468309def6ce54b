//! # CLI Commands
//!
//! Subcommands of the `crm` binary.

pub mod admin;
pub mod completions;
pub mod migrate;
pub mod seed;
pub mod validate;

use clap::{Args, Subcommand};

/// Available commands for the CRM CLI
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Seed the permission catalog and default role grants
    Seed,

    /// Create an administrator account
    CreateAdmin(CreateAdminArgs),

    /// Verify configuration and database connectivity
    Validate,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// Subcommand name for logs. Arguments are left out since they may carry
    /// a password.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Serve(_) => "serve",
            Self::Migrate(_) => "migrate",
            Self::Seed => "seed",
            Self::CreateAdmin(_) => "create-admin",
            Self::Validate => "validate",
            Self::Completions(_) => "completions",
        }
    }
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Server host to bind to
    #[arg(long, env = "CRM_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to bind to
    #[arg(short, long, env = "CRM_PORT", default_value = "8000")]
    pub port: u16,

    /// Enable TLS/HTTPS
    #[arg(long, env = "CRM_TLS", requires_all = ["tls_cert", "tls_key"])]
    pub tls: bool,

    /// TLS certificate file path
    #[arg(long, env = "CRM_TLS_CERT", requires = "tls")]
    pub tls_cert: Option<String>,

    /// TLS key file path
    #[arg(long, env = "CRM_TLS_KEY", requires = "tls")]
    pub tls_key: Option<String>,

    /// Start without applying pending migrations and seeds
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// List pending migrations without applying them
    #[arg(long, conflicts_with = "rollback")]
    pub dry_run: bool,

    /// Roll back the given number of applied migrations
    #[arg(long, value_name = "N")]
    pub rollback: Option<u32>,
}

/// Arguments for the create-admin command
#[derive(Args, Debug)]
pub struct CreateAdminArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub username: String,

    /// Read from `CRM_ADMIN_PASSWORD` when not given
    #[arg(long, env = "CRM_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
