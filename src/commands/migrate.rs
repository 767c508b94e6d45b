//! Migrate command: apply, roll back, inspect and scaffold migrations.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::utils::templates;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Scaffolding is a pure file operation
    if let MigrateAction::Create { name } = &args.action {
        let path = templates::generate_migration(name)?;
        println!("Created {}", path.display());
        println!("Registered in {}/mod.rs", templates::MIGRATIONS_DIR);
        return Ok(());
    }

    let db = Database::connect(&config).await?;

    match args.action {
        MigrateAction::Init => {
            db.install_migrations().await?;
            tracing::info!("Migration table ready");
        }
        MigrateAction::Up => {
            tracing::info!("Running pending migrations...");
            db.run_migrations().await?;
            tracing::info!("Migrations completed successfully");
        }
        MigrateAction::Down => {
            tracing::info!("Rolling back last migration...");
            db.rollback_migration().await?;
            tracing::info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            for migration in db.migration_status().await? {
                let state = if migration.applied { "applied" } else { "pending" };
                println!("{}: {}", migration.name, state);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables and re-running every migration...");
            db.fresh_migrations().await?;
            tracing::info!("Fresh migrations completed successfully");
        }
        MigrateAction::Create { .. } => {}
    }

    Ok(())
}
