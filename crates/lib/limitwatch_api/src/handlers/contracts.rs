//! Contract CRUD request handlers.
//!
//! Every route is owner-scoped: a contract is visible and mutable only to
//! the Google identity that created it. Observation fields
//! (`contacts_amount`, `last_checked`) are read-only here; the background
//! checker owns them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use limitwatch_core::models::{NewContract, parse_recipient_list};
use limitwatch_core::store::{self, ContractPatch};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::session::SessionUser;

/// Contract as rendered for the dashboard. The secret is returned to its
/// owner so the edit form can be pre-filled.
#[derive(Serialize)]
pub struct ContractInfo {
    pub id: i64,
    pub name: String,
    pub sfmc_subdomain: String,
    pub client_id: String,
    pub client_secret: String,
    pub de_key: String,
    pub contacts_limit: i64,
    pub contacts_amount: i64,
    /// Formatted `dd/mm/YYYY HH:MM`, `null` until the first successful check.
    pub last_checked: Option<String>,
    pub slack_users_ids: Vec<String>,
}

/// `GET /api/contracts` — the session owner's contracts, ordered by name.
pub async fn list_contracts_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<SessionUser>,
) -> ApiResult<Json<Vec<ContractInfo>>> {
    let contracts = store::list_for_owner(&state.pool, &user.0.sub).await?;
    let result = contracts
        .into_iter()
        .map(|c| ContractInfo {
            id: c.id,
            name: c.name,
            sfmc_subdomain: c.sfmc_subdomain,
            client_id: c.client_id,
            client_secret: c.client_secret,
            de_key: c.de_key,
            contacts_limit: c.contacts_limit,
            contacts_amount: c.contacts_amount,
            last_checked: c.last_checked.map(|t| t.format("%d/%m/%Y %H:%M").to_string()),
            slack_users_ids: c.slack_users_ids,
        })
        .collect();
    Ok(Json(result))
}

/// Dashboard form body for a new contract. Recipients arrive as one
/// comma-separated field.
#[derive(Deserialize)]
pub struct CreateContractForm {
    pub name: String,
    pub sfmc_subdomain: String,
    pub client_id: String,
    pub client_secret: String,
    pub de_key: String,
    pub contacts_limit: i64,
    #[serde(default)]
    pub slack_users_ids: String,
}

/// `POST /api/contracts` — create a contract for the session owner.
pub async fn add_contract_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<SessionUser>,
    Form(form): Form<CreateContractForm>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    if form.name.trim().is_empty() {
        return Err(ApiError::Validation("Name must not be empty".into()));
    }
    if form.contacts_limit < 0 {
        return Err(ApiError::Validation(
            "contacts_limit must not be negative".into(),
        ));
    }

    let new = NewContract {
        name: form.name,
        slack_users_ids: parse_recipient_list(&form.slack_users_ids),
        sfmc_subdomain: form.sfmc_subdomain,
        client_id: form.client_id,
        client_secret: form.client_secret,
        de_key: form.de_key,
        contacts_limit: form.contacts_limit,
    };

    let id = store::create_contract(&state.pool, &user.0.sub, &new).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"success": true, "id": id})),
    ))
}

/// Partial-update body; absent fields keep their current value.
#[derive(Deserialize, Default)]
pub struct UpdateContractRequest {
    pub name: Option<String>,
    pub sfmc_subdomain: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub de_key: Option<String>,
    pub contacts_limit: Option<i64>,
    pub slack_users_ids: Option<Vec<String>>,
}

/// `PATCH /api/contracts/{id}` — edit one of the owner's contracts.
pub async fn edit_contract_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<SessionUser>,
    Path(contract_id): Path<i64>,
    Json(body): Json<UpdateContractRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(limit) = body.contacts_limit
        && limit < 0
    {
        return Err(ApiError::Validation(
            "contacts_limit must not be negative".into(),
        ));
    }

    let patch = ContractPatch {
        name: body.name,
        sfmc_subdomain: body.sfmc_subdomain,
        client_id: body.client_id,
        client_secret: body.client_secret,
        de_key: body.de_key,
        contacts_limit: body.contacts_limit,
        slack_users_ids: body.slack_users_ids,
    };
    if patch.is_empty() {
        return Err(ApiError::Validation("No data provided".into()));
    }

    store::update_for_owner(&state.pool, contract_id, &user.0.sub, &patch).await?;
    Ok(Json(serde_json::json!({"success": true})))
}

/// `DELETE /api/contracts/{id}` — hard-delete one of the owner's contracts.
pub async fn delete_contract_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<SessionUser>,
    Path(contract_id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    store::delete_for_owner(&state.pool, contract_id, &user.0.sub).await?;
    Ok(Json(serde_json::json!({"success": true})))
}
