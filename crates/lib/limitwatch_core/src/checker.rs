//! Per-contract check cycle.
//!
//! One run: token exchange → contact count fetch → observation persistence →
//! breach alert if over the limit. Any failure is contained here: it is
//! logged, turned into a best-effort error alert to the contract's
//! recipients, and never propagates past this boundary.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::models::Contract;
use crate::notify::Notify;
use crate::sfmc::{SfmcClient, SfmcError};
use crate::store::{self, StoreError};

#[derive(Debug, Error)]
enum CheckError {
    #[error(transparent)]
    Sfmc(#[from] SfmcError),

    #[error("Observation update failed: {0}")]
    Store(#[from] StoreError),
}

/// Run one full check-and-alert cycle for a single contract.
///
/// Never returns an error; failures end up in the log and as error alerts.
/// Each run is stateless apart from the persisted observation fields, so
/// overlapping runs for the same contract cannot corrupt state.
pub async fn check_contract(
    pool: &SqlitePool,
    sfmc: &SfmcClient,
    notifier: &dyn Notify,
    contract: &Contract,
) {
    info!(contract = %contract.name, "starting contract check");

    match run_check(pool, sfmc, contract).await {
        Ok(contacts_amount) => {
            if contacts_amount > contract.contacts_limit {
                info!(
                    contract = %contract.name,
                    contacts_amount,
                    limit = contract.contacts_limit,
                    "limit reached, alerting recipients"
                );
                let message = format!(
                    "⚠️ ALARM!\nContacts limit reached in: {}\nContacts Now: {}\nContacts Limit: {}",
                    contract.name, contacts_amount, contract.contacts_limit
                );
                send_to_all(notifier, &contract.slack_users_ids, &message).await;
            }
        }
        Err(e) => {
            error!(contract = %contract.name, error = %e, "contract check failed");
            let message = format!(
                "🤭 Error during target contacts check for {}. Details:\n{}",
                contract.name, e
            );
            send_to_all(notifier, &contract.slack_users_ids, &message).await;
        }
    }
}

/// The fallible part of the cycle. The observation is persisted before the
/// threshold comparison, matching the check order: a breach alert always
/// refers to an already-recorded count.
async fn run_check(
    pool: &SqlitePool,
    sfmc: &SfmcClient,
    contract: &Contract,
) -> Result<i64, CheckError> {
    let access_token = sfmc
        .access_token(
            &contract.sfmc_subdomain,
            &contract.client_id,
            &contract.client_secret,
        )
        .await?;
    debug!(contract = %contract.name, "access token acquired");

    let contacts_amount = sfmc
        .contacts_amount(&contract.sfmc_subdomain, &contract.de_key, &access_token)
        .await?;
    info!(
        contract = %contract.name,
        contacts_amount,
        limit = contract.contacts_limit,
        "contacts amount fetched"
    );

    store::record_observation(pool, contract.id, contacts_amount, Utc::now()).await?;

    Ok(contacts_amount)
}

/// Dispatch one alert per recipient. Each attempt is independent: a failed
/// or rejected delivery never prevents the next recipient's attempt.
async fn send_to_all(notifier: &dyn Notify, recipients: &[String], message: &str) {
    for slack_user_id in recipients {
        let delivered = notifier.send(slack_user_id, message).await;
        debug!(%slack_user_id, delivered, "alert dispatch attempted");
    }
}
