//! Contract store — SQLite-backed queries.
//!
//! All access to the `contracts` table goes through this module. The
//! recipient list is stored as a JSON text column and exposed as
//! `Vec<String>`. `record_observation` is a single UPDATE so readers can
//! never see `contacts_amount` without the matching `last_checked`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::{Contract, NewContract};

/// Errors from contract store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Contract not found")]
    NotFound,

    #[error("Invalid recipient list: {0}")]
    Recipients(#[from] serde_json::Error),
}

/// Raw row shape; `slack_users_ids` is the JSON text column.
#[derive(sqlx::FromRow)]
struct ContractRow {
    id: i64,
    name: String,
    owner_google_id: String,
    slack_users_ids: String,
    sfmc_subdomain: String,
    client_id: String,
    client_secret: String,
    de_key: String,
    contacts_limit: i64,
    contacts_amount: i64,
    last_checked: Option<DateTime<Utc>>,
}

impl ContractRow {
    fn into_contract(self) -> Contract {
        Contract {
            id: self.id,
            name: self.name,
            owner_google_id: self.owner_google_id,
            slack_users_ids: serde_json::from_str(&self.slack_users_ids).unwrap_or_default(),
            sfmc_subdomain: self.sfmc_subdomain,
            client_id: self.client_id,
            client_secret: self.client_secret,
            de_key: self.de_key,
            contacts_limit: self.contacts_limit,
            contacts_amount: self.contacts_amount,
            last_checked: self.last_checked,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, owner_google_id, slack_users_ids, \
     sfmc_subdomain, client_id, client_secret, de_key, \
     contacts_limit, contacts_amount, last_checked FROM contracts";

/// List every registered contract, any owner. Used by the scheduler.
pub async fn list_contracts(pool: &SqlitePool) -> Result<Vec<Contract>, StoreError> {
    let rows = sqlx::query_as::<_, ContractRow>(SELECT_COLUMNS)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(ContractRow::into_contract).collect())
}

/// List one owner's contracts ordered by name. Used by the dashboard API.
pub async fn list_for_owner(pool: &SqlitePool, owner: &str) -> Result<Vec<Contract>, StoreError> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner_google_id = ? ORDER BY name");
    let rows = sqlx::query_as::<_, ContractRow>(&sql)
        .bind(owner)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(ContractRow::into_contract).collect())
}

/// Fetch one contract scoped to its owner.
pub async fn get_for_owner(
    pool: &SqlitePool,
    id: i64,
    owner: &str,
) -> Result<Option<Contract>, StoreError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ? AND owner_google_id = ?");
    let row = sqlx::query_as::<_, ContractRow>(&sql)
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(ContractRow::into_contract))
}

/// Create a contract for `owner` with `contacts_amount = 0` and no
/// `last_checked`. Returns the new row id.
pub async fn create_contract(
    pool: &SqlitePool,
    owner: &str,
    new: &NewContract,
) -> Result<i64, StoreError> {
    let recipients = serde_json::to_string(&new.slack_users_ids)?;
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO contracts \
         (name, owner_google_id, slack_users_ids, sfmc_subdomain, \
          client_id, client_secret, de_key, contacts_limit, contacts_amount) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0) RETURNING id",
    )
    .bind(&new.name)
    .bind(owner)
    .bind(&recipients)
    .bind(&new.sfmc_subdomain)
    .bind(&new.client_id)
    .bind(&new.client_secret)
    .bind(&new.de_key)
    .bind(new.contacts_limit)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Partial update of owner-editable fields.
#[derive(Debug, Clone, Default)]
pub struct ContractPatch {
    pub name: Option<String>,
    pub sfmc_subdomain: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub de_key: Option<String>,
    pub contacts_limit: Option<i64>,
    pub slack_users_ids: Option<Vec<String>>,
}

impl ContractPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.sfmc_subdomain.is_none()
            && self.client_id.is_none()
            && self.client_secret.is_none()
            && self.de_key.is_none()
            && self.contacts_limit.is_none()
            && self.slack_users_ids.is_none()
    }
}

/// Apply a patch to one of `owner`'s contracts. `NotFound` when the id does
/// not exist or belongs to someone else. Observation fields are untouched.
pub async fn update_for_owner(
    pool: &SqlitePool,
    id: i64,
    owner: &str,
    patch: &ContractPatch,
) -> Result<(), StoreError> {
    let current = get_for_owner(pool, id, owner)
        .await?
        .ok_or(StoreError::NotFound)?;

    let recipients = serde_json::to_string(
        patch
            .slack_users_ids
            .as_ref()
            .unwrap_or(&current.slack_users_ids),
    )?;

    sqlx::query(
        "UPDATE contracts SET name = ?, sfmc_subdomain = ?, client_id = ?, \
         client_secret = ?, de_key = ?, contacts_limit = ?, slack_users_ids = ? \
         WHERE id = ? AND owner_google_id = ?",
    )
    .bind(patch.name.as_ref().unwrap_or(&current.name))
    .bind(patch.sfmc_subdomain.as_ref().unwrap_or(&current.sfmc_subdomain))
    .bind(patch.client_id.as_ref().unwrap_or(&current.client_id))
    .bind(patch.client_secret.as_ref().unwrap_or(&current.client_secret))
    .bind(patch.de_key.as_ref().unwrap_or(&current.de_key))
    .bind(patch.contacts_limit.unwrap_or(current.contacts_limit))
    .bind(&recipients)
    .bind(id)
    .bind(owner)
    .execute(pool)
    .await?;
    Ok(())
}

/// Hard-delete one of `owner`'s contracts.
pub async fn delete_for_owner(pool: &SqlitePool, id: i64, owner: &str) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM contracts WHERE id = ? AND owner_google_id = ?")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Record a successful check: count and timestamp written in one statement,
/// so the pair is always observed together. Idempotent under retry.
pub async fn record_observation(
    pool: &SqlitePool,
    id: i64,
    contacts_amount: i64,
    checked_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE contracts SET contacts_amount = ?, last_checked = ? WHERE id = ?")
        .bind(contacts_amount)
        .bind(checked_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
