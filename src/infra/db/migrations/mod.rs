//! Database migrations.
//!
//! Module names follow `m{YYYYMMDD}_{NNNNNN}_{description}`; new ones are
//! scaffolded by `migrate create <name>` and must be registered below.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_enable_pg_trgm;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_enable_pg_trgm::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_and_unique() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();

        assert_eq!(names, sorted);
        assert_eq!(names[0], "m20240101_000001_create_users_table");
    }
}
