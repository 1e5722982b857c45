//! Integration tests for the startup diagnostics

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::StatusCode;

use startup_diagnostics::health::{
    self, ApplicationId, BrokerConnector, CheckContext, CheckStatus, Database, DiagnosticsRunner,
    ServiceClient, ServiceRequest,
};
use startup_diagnostics::config::PataviAuth;
use startup_diagnostics::health::runner::UNKNOWN_ERROR_PREFIX;
use startup_diagnostics::{DiagnosticsConfig, DiagnosticsError};

const HEADER_SUFFIX: &str = " could not be started. The following errors occured:</h3>";
const BLOCK_START: &str = "<div style=\"padding: 10px\">";

struct FakeDatabase(Option<&'static str>);

impl Database for FakeDatabase {
    fn query<'a>(&'a self, _sql: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        async move { self.0.map_or(Ok(()), |e| Err(anyhow!(e))) }.boxed()
    }
}

struct FakeService {
    status: StatusCode,
    calls: Arc<AtomicUsize>,
}

impl ServiceClient for FakeService {
    fn get<'a>(&'a self, _request: &'a ServiceRequest) -> BoxFuture<'a, anyhow::Result<StatusCode>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.status)
        }
        .boxed()
    }
}

struct FakeBroker(Option<&'static str>);

impl BrokerConnector for FakeBroker {
    fn connect<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        async move {
            // Make the broker the slowest check
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.0.map_or(Ok(()), |e| Err(anyhow!(e)))
        }
        .boxed()
    }
}

fn context(
    config: DiagnosticsConfig,
    database: Option<&'static str>,
    broker: Option<&'static str>,
) -> (CheckContext, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let ctx = CheckContext::from_config(config)
        .with_database(FakeDatabase(database))
        .with_service_client(FakeService {
            status: StatusCode::OK,
            calls: calls.clone(),
        })
        .with_broker(FakeBroker(broker));
    (ctx, calls)
}

fn config_with_api_key() -> DiagnosticsConfig {
    let mut config = DiagnosticsConfig::default();
    config.patavi.api_key = Some("testkey".to_string());
    config
}

/// Config for the Patavi server with every certificate in place
fn patavi_server_config(dir: &std::path::Path) -> DiagnosticsConfig {
    for file in ["server-key.pem", "server-crt.pem", "ca-crt.pem"] {
        std::fs::write(dir.join(file), "pem").unwrap();
    }
    let mut config = DiagnosticsConfig::default();
    config.certificates.dir = dir.to_path_buf();
    config
}

#[tokio::test]
async fn test_all_checks_pass() {
    let (ctx, calls) = context(config_with_api_key(), None, None);

    let result = health::run_startup_diagnostics("MCDA", &ctx).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_database_failure_report() {
    let (ctx, _) = context(config_with_api_key(), Some("connection refused"), None);

    let page = health::run_startup_diagnostics("GeMTC", &ctx)
        .await
        .unwrap()
        .expect("expected an error page");

    assert!(page.starts_with(&format!("<h3>GeMTC{HEADER_SUFFIX}")));
    assert_eq!(page.matches(BLOCK_START).count(), 1);
    assert!(page.contains(
        "Connection to database unsuccessful. <i>connection refused</i>.<br> Please make sure"
    ));
}

#[tokio::test]
async fn test_missing_api_key_skips_network() {
    let (ctx, calls) = context(DiagnosticsConfig::default(), None, None);

    let page = health::run_startup_diagnostics("MCDA", &ctx)
        .await
        .unwrap()
        .expect("expected an error page");

    assert!(page.ends_with(&format!("{BLOCK_START}Patavi API key not found</div>")));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_broker_failure_report() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _) = context(patavi_server_config(dir.path()), None, Some("ECONNREFUSED"));

    let page = health::run_startup_diagnostics("Patavi", &ctx)
        .await
        .unwrap()
        .expect("expected an error page");

    assert_eq!(page.matches(BLOCK_START).count(), 1);
    assert!(page.contains("AMQP connection to Rabbit unsuccessful. <i>ECONNREFUSED</i>"));
}

#[tokio::test]
async fn test_patavi_server_clean_run() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, calls) = context(patavi_server_config(dir.path()), None, None);

    let report = DiagnosticsRunner::new(ctx).run(ApplicationId::Patavi).await;

    assert!(report.is_clean());
    assert_eq!(report.count(CheckStatus::Pass), 3);
    // The server variant never calls out to the companion service
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_errors_keep_registry_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DiagnosticsConfig::default();
    config.certificates.dir = dir.path().to_path_buf();
    let (ctx, _) = context(config, Some("db down"), Some("ECONNREFUSED"));

    let report = DiagnosticsRunner::new(ctx).run(ApplicationId::Patavi).await;
    let errors = report.errors();

    // database, then three certificate files, then the (slowest) broker
    assert_eq!(errors.len(), 5);
    assert!(errors[0].as_str().contains("db down"));
    assert!(errors[1].as_str().starts_with("Patavi server key"));
    assert!(errors[2].as_str().starts_with("Patavi server certificate"));
    assert!(errors[3].as_str().starts_with("Patavi certificate authority"));
    assert!(errors[4].as_str().contains("ECONNREFUSED"));
}

#[tokio::test]
async fn test_repeated_runs_report_same_errors() {
    let (ctx, _) = context(DiagnosticsConfig::default(), Some("db down"), None);
    let runner = DiagnosticsRunner::new(ctx);

    let first = runner.run(ApplicationId::Mcda).await.errors();
    let second = runner.run(ApplicationId::Mcda).await.errors();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_application_is_rejected() {
    let (ctx, calls) = context(config_with_api_key(), None, None);

    let result = health::run_startup_diagnostics("appName", &ctx).await;

    assert!(matches!(
        result,
        Err(DiagnosticsError::UnknownApplication { ref name, .. }) if name == "appName"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreadable_credential_becomes_unknown_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory passes the presence check but cannot be read as a file
    let key = dir.path().join("key.pem");
    std::fs::create_dir(&key).unwrap();
    std::fs::write(dir.path().join("crt.pem"), "cert").unwrap();
    std::fs::write(dir.path().join("ca.pem"), "ca").unwrap();

    let mut config = DiagnosticsConfig::default();
    config.patavi.auth = PataviAuth::ClientCertificate;
    config.patavi.client_key = Some(key.clone());
    config.patavi.client_cert = Some(dir.path().join("crt.pem"));
    config.patavi.ca = Some(dir.path().join("ca.pem"));
    let (ctx, calls) = context(config, Some("db down"), None);

    let report = DiagnosticsRunner::new(ctx).run(ApplicationId::Gemtc).await;
    let errors = report.errors();

    assert_eq!(report.records[1].status, CheckStatus::Error);
    assert_eq!(errors.len(), 2);
    assert!(errors[0].as_str().contains("db down"));
    assert!(errors[1].as_str().starts_with(&format!(
        "{UNKNOWN_ERROR_PREFIX}could not read {}",
        key.display()
    )));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
