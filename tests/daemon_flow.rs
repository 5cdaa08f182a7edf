//! End-to-end polling-loop behavior against a mock provider and a mock
//! IP-lookup endpoint.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ddnsync::config::{Config, API_KEY_PLACEHOLDER, DEFAULT_INTERVAL};
use ddnsync::daemon::Daemon;
use ddnsync::error::Error;

fn write_config(dir: &TempDir, api_key: &str, ids: &[&str], interval: Option<i64>) -> PathBuf {
    let mut domains = BTreeMap::new();
    for id in ids {
        domains.insert((*id).to_string(), format!("rec-{id}.example.com"));
    }

    let config = Config {
        api_key: api_key.to_string(),
        domains,
        monitor_interval: interval,
    };

    let path = dir.path().join("ddnsync.json");
    config.store(&path).unwrap();
    path
}

async fn mount_ip(server: &MockServer, ip: &str) {
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": ip })))
        .mount(server)
        .await;
}

fn ip_endpoint(server: &MockServer) -> String {
    format!("{}/ip", server.uri())
}

#[tokio::test]
async fn init_pushes_the_resolved_ip_to_every_record() {
    let server = MockServer::start().await;
    mount_ip(&server, "198.51.100.7").await;

    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .and(body_string_contains("data=198.51.100.7"))
        .and(body_string_contains("priority=0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11", "22", "33"], Some(600));

    let daemon = Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
        .await
        .unwrap();

    assert_eq!(daemon.last_ip(), Some("198.51.100.7"));
    assert_eq!(daemon.interval(), Duration::from_secs(600));
}

#[tokio::test]
async fn unchanged_ip_triggers_no_update_calls() {
    let server = MockServer::start().await;
    mount_ip(&server, "198.51.100.7").await;

    // The two init pushes are the only edit calls allowed.
    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11", "22"], Some(600));

    let mut daemon = Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
        .await
        .unwrap();

    daemon.run_cycle().await;
    daemon.run_cycle().await;

    assert_eq!(daemon.last_ip(), Some("198.51.100.7"));
}

#[tokio::test]
async fn a_changed_ip_reloads_the_record_set_from_disk() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": "203.0.113.1" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_ip(&server, "203.0.113.2").await;

    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .and(body_string_contains("subdomain_id=11"))
        .and(body_string_contains("data=203.0.113.1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .and(body_string_contains("data=203.0.113.2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11"], Some(600));

    let mut daemon =
        Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
            .await
            .unwrap();
    assert_eq!(daemon.record_count(), 1);

    // Someone swaps the record set between cycles; the next change must use it.
    write_config(&dir, "k-test", &["21", "22"], Some(600));
    daemon.run_cycle().await;

    assert_eq!(daemon.last_ip(), Some("203.0.113.2"));
    assert_eq!(daemon.record_count(), 2);
}

#[tokio::test]
async fn a_bad_interval_is_corrected_and_persisted_before_the_first_sleep() {
    let server = MockServer::start().await;
    mount_ip(&server, "198.51.100.7").await;
    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11"], None);

    let daemon =
        Daemon::init_with_endpoints(config_path.clone(), &ip_endpoint(&server), &server.uri())
            .await
            .unwrap();

    assert_eq!(daemon.interval(), Duration::from_secs(DEFAULT_INTERVAL));
    let on_disk = Config::load(&config_path).unwrap();
    assert_eq!(on_disk.monitor_interval, Some(DEFAULT_INTERVAL as i64));
}

#[tokio::test]
async fn an_interval_edited_between_cycles_is_adopted() {
    let server = MockServer::start().await;
    mount_ip(&server, "198.51.100.7").await;
    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11"], Some(600));

    let mut daemon =
        Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
            .await
            .unwrap();
    assert_eq!(daemon.interval(), Duration::from_secs(600));

    write_config(&dir, "k-test", &["11"], Some(120));
    daemon.run_cycle().await;
    assert_eq!(daemon.interval(), Duration::from_secs(120));

    // Invalid on-disk values are ignored, the last good interval stays.
    write_config(&dir, "k-test", &["11"], Some(-1));
    daemon.run_cycle().await;
    assert_eq!(daemon.interval(), Duration::from_secs(120));
}

#[tokio::test]
async fn an_empty_api_key_aborts_before_any_network_call() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "", &["11"], Some(600));

    let err = Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConfigInvalid(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn a_placeholder_api_key_aborts_before_any_network_call() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, API_KEY_PLACEHOLDER, &["11"], Some(600));

    let err = Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConfigInvalid(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn an_empty_record_set_aborts_startup() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &[], Some(600));

    let err = Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConfigInvalid(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn initial_ip_resolution_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11"], Some(600));

    let err = Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn a_failed_lookup_mid_loop_skips_the_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": "203.0.113.1" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    // Only the init push may hit the edit endpoint.
    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11"], Some(600));

    let mut daemon =
        Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
            .await
            .unwrap();

    daemon.run_cycle().await;

    // Last known IP is untouched, so the change will be re-evaluated later.
    assert_eq!(daemon.last_ip(), Some("203.0.113.1"));
}

#[tokio::test]
async fn a_failed_lookup_skips_the_interval_re_read_too() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": "203.0.113.1" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11"], Some(600));

    let mut daemon =
        Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
            .await
            .unwrap();

    // The interval edit lands while the lookup is broken; a failed cycle
    // goes straight to the sleep without touching the config.
    write_config(&dir, "k-test", &["11"], Some(120));
    daemon.run_cycle().await;
    assert_eq!(daemon.interval(), Duration::from_secs(600));
}

#[tokio::test]
async fn an_emptied_record_set_mid_loop_warns_but_marks_the_ip_handled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": "203.0.113.1" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_ip(&server, "203.0.113.2").await;

    Mock::given(method("POST"))
        .and(path("/dns/record/edit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, "k-test", &["11"], Some(600));

    let mut daemon =
        Daemon::init_with_endpoints(config_path, &ip_endpoint(&server), &server.uri())
            .await
            .unwrap();

    write_config(&dir, "k-test", &[], Some(600));
    daemon.run_cycle().await;

    // No push happened, but the new address counts as handled for this change.
    assert_eq!(daemon.last_ip(), Some("203.0.113.2"));
    assert_eq!(daemon.record_count(), 0);
}
