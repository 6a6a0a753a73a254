//! User persistence over `auth.users`.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{info, warn};

use crate::domain::{DomainError, User};
use crate::ports::UserStore;

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
        let id: String = row
            .try_get("uid")
            .map_err(|e| DomainError::internal(format!("scan uid failure: {e}")))?;
        let username: String = row
            .try_get("name")
            .map_err(|e| DomainError::internal(format!("scan name failure: {e}")))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| DomainError::internal(format!("scan password_hash failure: {e}")))?;
        let rights: Vec<String> = row
            .try_get("rights")
            .map_err(|e| DomainError::internal(format!("scan rights failure: {e}")))?;
        let contacts_raw: serde_json::Value = row
            .try_get("contacts")
            .map_err(|e| DomainError::internal(format!("scan contacts failure: {e}")))?;
        let linked_id: String = row
            .try_get("linked_id")
            .map_err(|e| DomainError::internal(format!("scan linked_id failure: {e}")))?;

        let contacts: HashMap<String, String> = serde_json::from_value(contacts_raw)
            .map_err(|e| DomainError::internal(format!("unmarshal contacts failure: {e}")))?;

        Ok(User {
            id,
            username,
            password_hash,
            rights,
            contacts,
            linked_id,
        })
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get_user_by_id(&self, user_id: &str) -> Result<User, DomainError> {
        info!("GetUserByID started");

        let row = sqlx::query(
            r#"
            SELECT uid, name, password_hash, rights, contacts, linked_id
            FROM auth.users
            WHERE uid = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("get user failure: {e}")))?
        .ok_or_else(|| DomainError::not_found("user not found"))?;

        Self::row_to_user(&row)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, DomainError> {
        info!("GetUserByUsername started");

        let row = sqlx::query(
            r#"
            SELECT uid, name, password_hash, rights, contacts, linked_id
            FROM auth.users
            WHERE name = $1
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("get user failure: {e}")))?
        .ok_or_else(|| DomainError::not_found("user not found"))?;

        Self::row_to_user(&row)
    }

    async fn store_user(&self, user: &User) -> Result<(), DomainError> {
        info!("StoreUser started");

        let contacts_raw = serde_json::to_value(&user.contacts)
            .map_err(|e| DomainError::internal(format!("marshal failure: {e}")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::internal(format!("transaction failure: {e}")))?;

        let existing = sqlx::query("SELECT uid FROM auth.users WHERE uid = $1 OR name = $2 LIMIT 1")
            .bind(&user.id)
            .bind(&user.username)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::internal(format!("uniqueness check failure: {e}")))?;

        if existing.is_some() {
            return Err(DomainError::already_exists(format!(
                "uid = '{}' or name = '{}' already exists",
                user.id, user.username
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO auth.users (uid, name, password_hash, rights, contacts, linked_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.rights)
        .bind(contacts_raw)
        .bind(&user.linked_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::internal(format!("save user failure: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::internal(format!("commit failure: {e}")))?;

        info!("StoreUser completed");
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), DomainError> {
        info!("UpdateUser started");

        let username = (!user.username.is_empty()).then_some(user.username.as_str());
        let password_hash = (!user.password_hash.is_empty()).then_some(user.password_hash.as_str());
        let rights = (!user.rights.is_empty()).then_some(&user.rights);
        let contacts = if user.contacts.is_empty() {
            None
        } else {
            Some(
                serde_json::to_value(&user.contacts)
                    .map_err(|e| DomainError::internal(format!("marshal failure: {e}")))?,
            )
        };
        let linked_id = (!user.linked_id.is_empty()).then_some(user.linked_id.as_str());

        sqlx::query(
            r#"
            UPDATE auth.users
            SET
                name = COALESCE($1, name),
                password_hash = COALESCE($2, password_hash),
                rights = COALESCE($3, rights),
                contacts = COALESCE($4, contacts),
                linked_id = COALESCE($5, linked_id)
            WHERE uid = $6
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(rights)
        .bind(contacts)
        .bind(linked_id)
        .bind(&user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("update user failure: {e}")))?;

        info!("UpdateUser completed");
        Ok(())
    }

    async fn remove_user(&self, user_id: &str) -> Result<(), DomainError> {
        info!("RemoveUser started");

        let outcome = sqlx::query("DELETE FROM auth.users WHERE uid = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("exec delete query failure: {e}")))?;

        if outcome.rows_affected() == 0 {
            let err = DomainError::not_found(format!("not found user with id='{user_id}'"));
            warn!("{err}");
            return Err(err);
        }

        info!("RemoveUser completed");
        Ok(())
    }
}
