//! Timeout retry, server failover and health re-check behavior.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use aqualink_client::{AquaLinkClient, ApiError, ManualProbe, ServerTarget};
use aqualink_store::MemoryStore;

use common::{
    account, client_data_path, client_payload, fast_options, mount_health, TestHarness, BACKOFF,
    RETRIES, SLOW,
};

#[tokio::test]
async fn primary_server_error_fails_over_to_backup_once() {
    let h = TestHarness::new().await;
    mount_health(&h.primary, 200).await;
    mount_health(&h.backup, 200).await;

    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&h.primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .expect(1)
        .mount(&h.backup)
        .await;

    let response = h.client.client_data(&account()).await.unwrap();
    assert_eq!(response.customer.account, common::ACCOUNT);
    assert_eq!(h.client.active_server(), ServerTarget::Backup);
}

#[tokio::test]
async fn backup_server_error_is_not_retried_again() {
    let h = TestHarness::new().await;
    mount_health(&h.primary, 200).await;
    mount_health(&h.backup, 200).await;

    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&h.primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&h.backup)
        .await;

    let result = h.client.client_data(&account()).await;
    assert!(matches!(result, Err(ApiError::ServerError { status: 502 })));
}

#[tokio::test]
async fn server_error_without_healthy_backup_surfaces_status() {
    let h = TestHarness::new().await;
    mount_health(&h.primary, 200).await;
    mount_health(&h.backup, 500).await;

    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&h.primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .expect(0)
        .mount(&h.backup)
        .await;

    let result = h.client.client_data(&account()).await;
    assert!(matches!(result, Err(ApiError::ServerError { status: 503 })));
    assert_eq!(h.client.active_server(), ServerTarget::Primary);
}

#[tokio::test]
async fn timeout_is_retried_with_backoff_then_surfaced() {
    let (primary, _store, client) = TestHarness::without_backup().await;
    mount_health(&primary, 200).await;

    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(client_payload())
                .set_delay(SLOW),
        )
        .expect(u64::from(RETRIES) + 1)
        .mount(&primary)
        .await;

    let started = Instant::now();
    let result = client.client_data(&account()).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(ApiError::Timeout)));
    assert_eq!(result.unwrap_err().status(), 408);

    // Backoff waits are BACKOFF, 2 * BACKOFF, ...
    let backoff_total: Duration = (0..RETRIES).map(|n| BACKOFF * 2u32.pow(n)).sum();
    assert!(elapsed >= common::TIMEOUT * (RETRIES + 1) + backoff_total);
}

#[tokio::test]
async fn primary_timeout_escalates_to_backup() {
    let h = TestHarness::new().await;
    mount_health(&h.primary, 200).await;
    mount_health(&h.backup, 200).await;

    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(client_payload())
                .set_delay(SLOW),
        )
        .expect(u64::from(RETRIES) + 1)
        .mount(&h.primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .expect(1)
        .mount(&h.backup)
        .await;

    let response = h.client.client_data(&account()).await.unwrap();
    assert!(response.success);
    assert_eq!(h.client.active_server(), ServerTarget::Backup);
}

#[tokio::test]
async fn timeout_on_both_servers_restores_primary() {
    let h = TestHarness::new().await;
    mount_health(&h.primary, 200).await;
    mount_health(&h.backup, 200).await;

    for server in [&h.primary, &h.backup] {
        Mock::given(method("GET"))
            .and(path(client_data_path()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(client_payload())
                    .set_delay(SLOW),
            )
            .mount(server)
            .await;
    }

    let result = h.client.client_data(&account()).await;
    assert!(matches!(result, Err(ApiError::Timeout)));
    assert_eq!(h.client.active_server(), ServerTarget::Primary);
}

#[tokio::test]
async fn backup_failure_after_primary_timeout_surfaces_timeout() {
    let h = TestHarness::new().await;
    mount_health(&h.primary, 200).await;
    mount_health(&h.backup, 200).await;

    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_delay(SLOW))
        .mount(&h.primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.backup)
        .await;

    let result = h.client.client_data(&account()).await;
    assert!(matches!(result, Err(ApiError::Timeout)));
    assert_eq!(h.client.active_server(), ServerTarget::Primary);
}

#[tokio::test]
async fn unhealthy_primary_selects_backup() {
    let h = TestHarness::new().await;
    mount_health(&h.primary, 503).await;
    mount_health(&h.backup, 200).await;

    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .expect(0)
        .mount(&h.primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .expect(1)
        .mount(&h.backup)
        .await;

    h.client.client_data(&account()).await.unwrap();
    assert_eq!(h.client.active_server(), ServerTarget::Backup);
}

#[tokio::test]
async fn health_is_checked_once_per_interval() {
    let h = TestHarness::new().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .expect(3)
        .mount(&h.primary)
        .await;

    for _ in 0..3 {
        h.client.client_data(&account()).await.unwrap();
    }
}

#[tokio::test]
async fn health_is_rechecked_after_interval() {
    let primary = wiremock::MockServer::start().await;
    let backup = wiremock::MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .mount(&primary)
        .await;

    let client = AquaLinkClient::with_options(
        fast_options(&primary.uri())
            .with_backup_url(backup.uri())
            .with_recheck_interval(Duration::from_millis(50)),
        Arc::new(MemoryStore::new()),
        Arc::new(ManualProbe::new(true)),
    )
    .unwrap();

    client.client_data(&account()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    client.client_data(&account()).await.unwrap();
}

#[tokio::test]
async fn recheck_returns_to_primary_after_failover() {
    let primary = wiremock::MockServer::start().await;
    let backup = wiremock::MockServer::start().await;
    mount_health(&primary, 200).await;
    mount_health(&backup, 200).await;

    // First request fails on the primary, later ones succeed.
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .mount(&primary)
        .await;
    Mock::given(method("GET"))
        .and(path(client_data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_payload()))
        .mount(&backup)
        .await;

    let client = AquaLinkClient::with_options(
        fast_options(&primary.uri())
            .with_backup_url(backup.uri())
            .with_recheck_interval(Duration::from_millis(50)),
        Arc::new(MemoryStore::new()),
        Arc::new(ManualProbe::new(true)),
    )
    .unwrap();

    client.client_data(&account()).await.unwrap();
    assert_eq!(client.active_server(), ServerTarget::Backup);

    tokio::time::sleep(Duration::from_millis(80)).await;
    client.client_data(&account()).await.unwrap();
    assert_eq!(client.active_server(), ServerTarget::Primary);
}
