//! Postgres-backed credential store.
//!
//! Expected schema (owned and migrated elsewhere; this crate only reads and
//! writes it):
//!
//! - `users(id uuid pk, username text unique, full_name text null,
//!   password_digest text, created_at timestamptz)`
//! - `roles(id uuid pk, name text unique)`
//! - `user_roles(user_id uuid fk, role_id uuid fk, pk(user_id, role_id))`
//! - `menus(id uuid pk, name text, path text, parent_id uuid null fk)`
//! - `role_menu_access(role_id uuid fk, menu_id uuid fk, pk(role_id, menu_id))`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use rolegate_core::{MenuId, RoleId, UserId};

use crate::credential::CredentialStore;
use crate::error::StoreError;
use crate::records::{MenuNode, RoleRecord, UserRecord};

const UNIQUE_VIOLATION: &str = "23505";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::UniqueViolation(db.constraint().unwrap_or("unknown").to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Query(format!("column {name}: {e}")))
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    Ok(UserRecord {
        id: UserId::from_uuid(column::<Uuid>(row, "id")?),
        username: column(row, "username")?,
        full_name: column(row, "full_name")?,
        password_digest: column(row, "password_digest")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn role_from_row(row: &PgRow) -> Result<RoleRecord, StoreError> {
    Ok(RoleRecord {
        id: RoleId::from_uuid(column::<Uuid>(row, "id")?),
        name: column(row, "name")?,
    })
}

fn menu_from_row(row: &PgRow) -> Result<MenuNode, StoreError> {
    Ok(MenuNode {
        id: MenuId::from_uuid(column::<Uuid>(row, "id")?),
        name: column(row, "name")?,
        path: column(row, "path")?,
        parent_id: column::<Option<Uuid>>(row, "parent_id")?.map(MenuId::from_uuid),
    })
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, full_name, password_digest, created_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(
        &self,
        username: &str,
        password_digest: &str,
    ) -> Result<UserRecord, StoreError> {
        // The unique index on username arbitrates concurrent registrations.
        let row = sqlx::query(
            "INSERT INTO users (id, username, password_digest, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, full_name, password_digest, created_at",
        )
        .bind(UserId::new().as_uuid())
        .bind(username)
        .bind(password_digest)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        user_from_row(&row)
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(role_from_row).transpose()
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM roles WHERE id = $1")
            .bind(role_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        row.as_ref().map(role_from_row).transpose()
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT r.id, r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 \
             ORDER BY r.name",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter().map(role_from_row).collect()
    }

    async fn has_role_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM user_roles WHERE user_id = $1 AND role_id = $2",
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.is_some())
    }

    async fn list_menu_nodes_for_role(
        &self,
        role_id: RoleId,
    ) -> Result<Vec<MenuNode>, StoreError> {
        let rows = sqlx::query(
            "SELECT m.id, m.name, m.path, m.parent_id FROM menus m \
             JOIN role_menu_access rma ON rma.menu_id = m.id \
             WHERE rma.role_id = $1 \
             ORDER BY m.name",
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter().map(menu_from_row).collect()
    }
}
