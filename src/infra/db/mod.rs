//! Database connection and migration management.

use std::collections::HashSet;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
};
use sea_orm_migration::{seaql_migrations, MigratorTrait};

use crate::config::Config;

pub mod migrations;

pub use migrations::Migrator;

/// Applied state of one known migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
}

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the connection pool. Migrations are not applied here.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.database_url());
        options
            .max_connections(config.database.max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(config.debug);

        let connection = SeaDatabase::connect(options).await?;
        tracing::info!(
            max_connections = config.database.max_connections,
            "Database connected"
        );

        Ok(Self { connection })
    }

    /// Wrap an existing connection (tests use `DatabaseConnection::Disconnected`).
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Create the migration bookkeeping table without applying anything.
    pub async fn install_migrations(&self) -> Result<(), DbErr> {
        Migrator::install(&self.connection).await
    }

    /// Apply all pending migrations.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Roll back the most recent migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Every known migration with its applied flag, in order.
    pub async fn migration_status(&self) -> Result<Vec<MigrationStatus>, DbErr> {
        Migrator::install(&self.connection).await?;

        let applied: HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        Ok(Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                MigrationStatus {
                    applied: applied.contains(&name),
                    name,
                }
            })
            .collect())
    }

    /// Drop every table and re-apply all migrations.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    /// Check that a pooled connection is reachable.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection.ping().await
    }
}
