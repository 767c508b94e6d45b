//! Migration: enable `pg_trgm` and index user search columns.
//!
//! The listing endpoint filters with `LOWER(col) LIKE '%term%'`, which a
//! trigram GIN index can serve.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS pg_trgm")
            .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_users_email_trgm \
             ON users USING gin (lower(email) gin_trgm_ops)",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_users_username_trgm \
             ON users USING gin (lower(username) gin_trgm_ops)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP INDEX IF EXISTS idx_users_username_trgm")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_users_email_trgm")
            .await?;

        // pg_trgm itself is left installed.
        Ok(())
    }
}
