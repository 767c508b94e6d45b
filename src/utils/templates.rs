//! Migration scaffolding for `migrate create <name>`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::errors::{AppError, AppResult};

/// Where migration modules live, relative to the project root
pub const MIGRATIONS_DIR: &str = "src/infra/db/migrations";

/// Write a new migration module and register it with the migrator.
///
/// Returns the path of the created file.
pub fn generate_migration(name: &str) -> AppResult<PathBuf> {
    generate_migration_in(Path::new(MIGRATIONS_DIR), name, Utc::now())
}

pub fn generate_migration_in(dir: &Path, name: &str, now: DateTime<Utc>) -> AppResult<PathBuf> {
    let snake_name = to_snake_case(name);
    if snake_name.is_empty() || !snake_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::validation(format!(
            "Migration name '{}' must contain only letters, digits and underscores",
            name
        )));
    }

    let module = migration_module_name(&snake_name, now);
    let path = dir.join(format!("{}.rs", module));
    if path.exists() {
        return Err(AppError::conflict(format!("Migration {}", module)));
    }

    write_file(&path, &migration_template(&snake_name))?;

    let mod_rs = dir.join("mod.rs");
    let current = fs::read_to_string(&mod_rs).map_err(|e| AppError::internal(e.to_string()))?;
    write_file(&mod_rs, &register_migration(&current, &module)?)?;

    Ok(path)
}

/// `m{YYYYMMDD}_{HHMMSS}_{name}`, sorting after every earlier migration.
pub fn migration_module_name(snake_name: &str, now: DateTime<Utc>) -> String {
    format!("m{}_{}", now.format("%Y%m%d_%H%M%S"), snake_name)
}

/// Table a migration name most likely targets: `create_posts_table` -> `posts`.
fn table_name(snake_name: &str) -> String {
    let trimmed = snake_name.strip_prefix("create_").unwrap_or(snake_name);
    trimmed.strip_suffix("_table").unwrap_or(trimmed).to_string()
}

fn migration_template(snake_name: &str) -> String {
    let table = table_name(snake_name);
    let iden = to_pascal_case(&table);

    format!(
        r#"//! Migration: {snake_name}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {{
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {{
        manager
            .create_table(
                Table::create()
                    .table({iden}::Table)
                    .if_not_exists()
                    .col(ColumnDef::new({iden}::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new({iden}::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new({iden}::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }}

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {{
        manager
            .drop_table(Table::drop().table({iden}::Table).to_owned())
            .await
    }}
}}

#[derive(Iden)]
enum {iden} {{
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
}}
"#
    )
}

/// Add `mod <module>;` and its `Box::new(...)` entry to the migrator source.
pub fn register_migration(mod_rs: &str, module: &str) -> AppResult<String> {
    let mod_line = format!("mod {};", module);
    if mod_rs.contains(&mod_line) {
        return Ok(mod_rs.to_string());
    }

    let last_mod = mod_rs
        .lines()
        .filter(|l| l.starts_with("mod m"))
        .last()
        .ok_or_else(|| AppError::internal("no migration modules found in mod.rs"))?;
    let vec_close = "        ]\n";
    if !mod_rs.contains(vec_close) {
        return Err(AppError::internal("migration list not found in mod.rs"));
    }

    let with_mod = mod_rs.replacen(last_mod, &format!("{}\n{}", last_mod, mod_line), 1);
    let entry = format!("            Box::new({}::Migration),\n", module);
    Ok(with_mod.replacen(vec_close, &format!("{}{}", entry, vec_close), 1))
}

fn write_file(path: &Path, content: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::internal(e.to_string()))?;
    }

    fs::write(path, content).map_err(|e| AppError::internal(e.to_string()))?;
    Ok(())
}

/// `AddPostsTable` / `add-posts table` -> `add_posts_table`
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for c in s.trim().chars() {
        if c.is_uppercase() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else if c == '-' || c.is_whitespace() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(c);
        }
    }
    result
}

pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MOD_RS: &str = "use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
        ]
    }
}
";

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_snake_case("AddPostsTable"), "add_posts_table");
        assert_eq!(to_snake_case("add-posts table"), "add_posts_table");
        assert_eq!(to_snake_case("create_posts"), "create_posts");
        assert_eq!(to_pascal_case("blog_posts"), "BlogPosts");
    }

    #[test]
    fn test_module_name_uses_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            migration_module_name("create_posts_table", now),
            "m20250309_140507_create_posts_table"
        );
    }

    #[test]
    fn test_template_targets_table() {
        let content = migration_template("create_blog_posts_table");
        assert!(content.contains("enum BlogPosts"));
        assert!(content.contains(".table(BlogPosts::Table)"));
    }

    #[test]
    fn test_register_migration_appends_module_and_entry() {
        let updated = register_migration(MOD_RS, "m20250309_140507_create_posts").unwrap();

        assert!(updated.contains(
            "mod m20240101_000001_create_users_table;\nmod m20250309_140507_create_posts;"
        ));
        assert!(updated.contains(
            "Box::new(m20240101_000001_create_users_table::Migration),\n            Box::new(m20250309_140507_create_posts::Migration),\n        ]"
        ));
    }

    #[test]
    fn test_register_migration_is_idempotent() {
        let once = register_migration(MOD_RS, "m20250309_140507_create_posts").unwrap();
        let twice = register_migration(&once, "m20250309_140507_create_posts").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let dir = std::env::temp_dir();
        assert!(generate_migration_in(&dir, "drop;table", Utc::now()).is_err());
    }
}
