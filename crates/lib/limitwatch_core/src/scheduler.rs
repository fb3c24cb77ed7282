//! Fan-out scheduling loop.
//!
//! A fixed-period timer drives the checks. Each tick takes a snapshot of the
//! registered contracts and spawns one detached task per contract; the loop
//! never joins them, so a slow or hung check cannot delay the next tick or
//! any other contract's check. Overlapping runs for the same contract are
//! allowed.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::checker;
use crate::notify::Notify;
use crate::sfmc::SfmcClient;
use crate::store;

/// Run the scheduling loop forever. Intended to be spawned as a background
/// task next to the HTTP server.
pub async fn run(
    pool: SqlitePool,
    sfmc: SfmcClient,
    notifier: Arc<dyn Notify>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so the first check
    // runs one full period after startup.
    interval.tick().await;

    loop {
        interval.tick().await;
        check_all(&pool, &sfmc, &notifier).await;
    }
}

/// One tick: list every contract and launch an independent check per
/// contract. Only the listing is awaited; the checks are fire-and-forget.
/// A listing failure skips this tick and is retried on the next.
pub async fn check_all(pool: &SqlitePool, sfmc: &SfmcClient, notifier: &Arc<dyn Notify>) {
    debug!("starting all contracts check");

    let contracts = match store::list_contracts(pool).await {
        Ok(contracts) => contracts,
        Err(e) => {
            error!(error = %e, "failed to list contracts, skipping tick");
            return;
        }
    };

    for contract in contracts {
        let pool = pool.clone();
        let sfmc = sfmc.clone();
        let notifier = Arc::clone(notifier);
        tokio::spawn(async move {
            checker::check_contract(&pool, &sfmc, notifier.as_ref(), &contract).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use async_trait::async_trait;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::CoreConfig;
    use crate::store::tests::{sample_contract, test_pool};

    struct NullNotifier;

    #[async_trait]
    impl Notify for NullNotifier {
        async fn send(&self, _slack_user_id: &str, _message: &str) -> bool {
            true
        }
    }

    async fn mock_sfmc(server: &MockServer, response_delay: Duration) -> SfmcClient {
        Mock::given(method("POST"))
            .and(path("/v2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "tok"}))
                    .set_delay(response_delay),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/data/v1/customobjectdata/key/.+/rowset$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"items": [{"values": {"count": "7"}}]})),
            )
            .mount(server)
            .await;

        let config = CoreConfig {
            sfmc_auth_base_url: Some(server.uri()),
            sfmc_rest_base_url: Some(server.uri()),
            ..CoreConfig::default()
        };
        SfmcClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn one_tick_checks_every_contract() {
        let pool = test_pool().await;
        let first = store::create_contract(&pool, "owner-a", &sample_contract("Acme"))
            .await
            .unwrap();
        let second = store::create_contract(&pool, "owner-b", &sample_contract("Globex"))
            .await
            .unwrap();

        let server = MockServer::start().await;
        let sfmc = mock_sfmc(&server, Duration::ZERO).await;
        let notifier: Arc<dyn Notify> = Arc::new(NullNotifier);

        check_all(&pool, &sfmc, &notifier).await;

        // The spawned checks run unsupervised; poll until both land.
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let contracts = store::list_contracts(&pool).await.unwrap();
            if contracts.iter().all(|c| c.last_checked.is_some()) {
                for c in &contracts {
                    assert_eq!(c.contacts_amount, 7);
                }
                assert!(contracts.iter().any(|c| c.id == first));
                assert!(contracts.iter().any(|c| c.id == second));
                break;
            }
            assert!(Instant::now() < deadline, "checks did not complete");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test]
    async fn failing_contract_does_not_block_others() {
        let pool = test_pool().await;
        let broken = store::create_contract(
            &pool,
            "owner-a",
            &crate::models::NewContract {
                client_id: "bad".into(),
                ..sample_contract("Broken")
            },
        )
        .await
        .unwrap();
        let healthy = store::create_contract(&pool, "owner-a", &sample_contract("Healthy"))
            .await
            .unwrap();

        let server = MockServer::start().await;
        // Reject the broken contract's credentials; mounted first so it wins.
        Mock::given(method("POST"))
            .and(path("/v2/token"))
            .and(wiremock::matchers::body_string_contains("\"client_id\":\"bad\""))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let sfmc = mock_sfmc(&server, Duration::ZERO).await;
        let notifier: Arc<dyn Notify> = Arc::new(NullNotifier);

        check_all(&pool, &sfmc, &notifier).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let contracts = store::list_contracts(&pool).await.unwrap();
            let healthy_row = contracts.iter().find(|c| c.id == healthy).unwrap();
            if healthy_row.last_checked.is_some() {
                assert_eq!(healthy_row.contacts_amount, 7);
                let broken_row = contracts.iter().find(|c| c.id == broken).unwrap();
                assert!(broken_row.last_checked.is_none());
                assert_eq!(broken_row.contacts_amount, 0);
                break;
            }
            assert!(Instant::now() < deadline, "healthy check did not complete");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test]
    async fn tick_returns_without_waiting_for_slow_checks() {
        let pool = test_pool().await;
        store::create_contract(&pool, "owner-a", &sample_contract("Sluggish"))
            .await
            .unwrap();

        let server = MockServer::start().await;
        let sfmc = mock_sfmc(&server, Duration::from_secs(5)).await;
        let notifier: Arc<dyn Notify> = Arc::new(NullNotifier);

        let started = Instant::now();
        check_all(&pool, &sfmc, &notifier).await;
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "check_all must not block on checker completion"
        );
    }
}
