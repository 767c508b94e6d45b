//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Backend template: HTTP API, migrations, background worker and seeding
#[derive(Parser, Debug)]
#[command(name = "backend-template")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Manage database migrations
    Migrate(MigrateArgs),

    /// Run or inspect the background job queue
    Jobs(JobsArgs),

    /// Create the initial user from SEED_USER_* variables
    Seed,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (defaults to SERVER_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (defaults to SERVER_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Apply pending migrations before serving
    #[arg(long)]
    pub migrate: bool,
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Create the migration tracking table
    Init,
    /// Scaffold a new migration file
    Create {
        /// Migration name, e.g. create_posts_table
        name: String,
    },
    /// Apply pending migrations
    Up,
    /// Roll back the last migration
    Down,
    /// Show applied and pending migrations
    Status,
    /// Drop all tables and re-apply every migration
    Fresh,
}

#[derive(Parser, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub action: JobsAction,
}

#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// Start the worker and the periodic scheduler
    Work,
    /// Show job counts by type and status
    List,
    /// Remove failed and killed jobs
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from(["backend-template", "serve", "--port", "9000", "--migrate"])
            .unwrap();

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.host.is_none());
                assert!(args.migrate);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_migrate_create() {
        let cli =
            Cli::try_parse_from(["backend-template", "-v", "migrate", "create", "add_posts"]).unwrap();

        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Create { ref name }
            }) if name == "add_posts"
        ));
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["backend-template", "jobs", "purge"]).is_err());
    }
}
