//! User repository: SeaORM-backed storage for [`User`].

use async_trait::async_trait;
use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User, UserChanges};
use crate::errors::{AppError, AppResult};
use crate::types::{PaginationParams, SortField, SortOrder};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Filters and ordering for a user listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub pagination: PaginationParams,
    /// Case-insensitive substring match against email and username
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user. A unique violation on email or username is `Conflict`.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Apply a partial update; `NotFound` when the id is unknown.
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Hard delete; `NotFound` when nothing was removed.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// One page of users plus the total number of matches.
    async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, u64)>;
}

/// SeaORM implementation of [`UserRepository`]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(query: &UserQuery) -> Select<UserEntity> {
        let mut select = UserEntity::find();

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            let like = || LikeExpr::new(pattern.as_str()).escape(LIKE_ESCAPE);
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::Email))).like(like()))
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::Username))).like(like())),
            );
        }

        let column = match query.sort_by {
            SortField::CreatedAt => user::Column::CreatedAt,
            SortField::UpdatedAt => user::Column::UpdatedAt,
            SortField::Email => user::Column::Email,
            SortField::Username => user::Column::Username,
        };
        let order = match query.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        // Tie-break on id so pages stay stable between requests
        select
            .order_by(column, order.clone())
            .order_by(user::Column::Id, order)
    }
}

const LIKE_ESCAPE: char = '\\';

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "User"))?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();

        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "User"))?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, u64)> {
        let paginator = Self::filtered(query).paginate(&self.db, query.pagination.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.pagination.page_index()).await?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_search_lowercases_both_columns() {
        let query = UserQuery {
            search: Some("  JaNe ".into()),
            ..Default::default()
        };

        let sql = UserStore::filtered(&query).build(DbBackend::Postgres).to_string();

        assert!(sql.contains(r#"LOWER("email")"#));
        assert!(sql.contains(r#"LOWER("username")"#));
        assert!(sql.contains("'%jane%'"));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("jane_doe"), r"jane\_doe");
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_search_wildcards_are_escaped() {
        let query = UserQuery {
            search: Some("jane_doe".into()),
            ..Default::default()
        };
        let sql = UserStore::filtered(&query).build(DbBackend::Postgres).to_string();

        assert!(!sql.contains("'%jane_doe%'"));
        assert!(sql.contains(r"\_doe"));
        assert!(sql.contains("ESCAPE"));

        let query = UserQuery {
            search: Some("%".into()),
            ..Default::default()
        };
        let sql = UserStore::filtered(&query).build(DbBackend::Postgres).to_string();

        assert!(!sql.contains("'%%%'"));
        assert!(sql.contains(r"\%"));
    }

    #[test]
    fn test_default_ordering_is_newest_first() {
        let sql = UserStore::filtered(&UserQuery::default())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"ORDER BY "users"."created_at" DESC, "users"."id" DESC"#));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_sort_by_username_ascending() {
        let query = UserQuery {
            sort_by: SortField::Username,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        let sql = UserStore::filtered(&query).build(DbBackend::Postgres).to_string();
        assert!(sql.contains(r#"ORDER BY "users"."username" ASC"#));
    }
}
