//! Capabilities handed to every check
//!
//! Each external dependency sits behind a small trait so checks can be run
//! against injected stand-ins. The real implementations perform exactly one
//! connection attempt and never retry.

use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::{Certificate, Identity, StatusCode};
use sqlx::{Connection, PgConnection};
use tokio::net::TcpStream;
use url::Url;

use crate::config::DiagnosticsConfig;

/// Something that can run a single SQL statement
pub trait Database: Send + Sync {
    fn query<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// Credentials presented to the companion service
#[derive(Clone)]
pub enum ServiceCredentials {
    /// Sent as the `X-api-key` header
    ApiKey(String),
    /// PEM-encoded mutual TLS material
    ClientCertificate(ClientIdentity),
}

#[derive(Clone)]
pub struct ClientIdentity {
    pub key: Vec<u8>,
    pub certificate: Vec<u8>,
    pub authority: Vec<u8>,
}

#[derive(Clone)]
pub struct ServiceRequest {
    pub url: String,
    pub credentials: ServiceCredentials,
}

/// HTTP client able to perform an authenticated GET
pub trait ServiceClient: Send + Sync {
    fn get<'a>(&'a self, request: &'a ServiceRequest) -> BoxFuture<'a, anyhow::Result<StatusCode>>;
}

/// Something that can open a connection to a message broker
pub trait BrokerConnector: Send + Sync {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<()>>;
}

impl<T: Database + ?Sized> Database for Arc<T> {
    fn query<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        self.as_ref().query(sql)
    }
}

impl<T: ServiceClient + ?Sized> ServiceClient for Arc<T> {
    fn get<'a>(&'a self, request: &'a ServiceRequest) -> BoxFuture<'a, anyhow::Result<StatusCode>> {
        self.as_ref().get(request)
    }
}

impl<T: BrokerConnector + ?Sized> BrokerConnector for Arc<T> {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        self.as_ref().connect(url)
    }
}

/// PostgreSQL database reached through a fresh connection per query
pub struct PgDatabase {
    url: String,
}

impl PgDatabase {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Database for PgDatabase {
    fn query<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        async move {
            let mut conn = PgConnection::connect(&self.url).await?;
            sqlx::query(sql).execute(&mut conn).await?;
            conn.close().await?;
            Ok(())
        }
        .boxed()
    }
}

/// reqwest-backed client, built per request so each request carries its own identity
#[derive(Default)]
pub struct ReqwestServiceClient;

impl ReqwestServiceClient {
    fn client_for(credentials: &ServiceCredentials) -> anyhow::Result<reqwest::Client> {
        let builder = reqwest::Client::builder().use_rustls_tls();
        let builder = match credentials {
            ServiceCredentials::ApiKey(_) => builder,
            ServiceCredentials::ClientCertificate(identity) => {
                let mut pem = identity.certificate.clone();
                pem.push(b'\n');
                pem.extend_from_slice(&identity.key);
                builder
                    .identity(Identity::from_pem(&pem).context("invalid client identity")?)
                    .add_root_certificate(
                        Certificate::from_pem(&identity.authority)
                            .context("invalid certificate authority")?,
                    )
            }
        };
        Ok(builder.build()?)
    }
}

impl ServiceClient for ReqwestServiceClient {
    fn get<'a>(&'a self, request: &'a ServiceRequest) -> BoxFuture<'a, anyhow::Result<StatusCode>> {
        async move {
            let client = Self::client_for(&request.credentials)?;
            let mut builder = client.get(&request.url);
            if let ServiceCredentials::ApiKey(key) = &request.credentials {
                builder = builder.header("X-api-key", key);
            }
            let response = builder.send().await?;
            Ok(response.status())
        }
        .boxed()
    }
}

/// Broker probe that opens (and drops) a TCP connection to the broker endpoint
#[derive(Default)]
pub struct TcpBrokerConnector;

impl TcpBrokerConnector {
    fn default_port(scheme: &str) -> u16 {
        match scheme {
            "amqps" => 5671,
            _ => 5672,
        }
    }
}

impl BrokerConnector for TcpBrokerConnector {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        async move {
            let parsed = Url::parse(url).with_context(|| format!("invalid broker url {url}"))?;
            let host = parsed
                .host_str()
                .filter(|host| !host.is_empty())
                .ok_or_else(|| anyhow!("no host in broker url {url}"))?;
            let port = parsed
                .port()
                .unwrap_or_else(|| Self::default_port(parsed.scheme()));
            TcpStream::connect((host, port)).await?;
            Ok(())
        }
        .boxed()
    }
}

/// Configuration and collaborators shared read-only by all checks of a run
#[derive(Clone)]
pub struct CheckContext {
    pub config: Arc<DiagnosticsConfig>,
    pub database: Arc<dyn Database>,
    pub service_client: Arc<dyn ServiceClient>,
    pub broker: Arc<dyn BrokerConnector>,
}

impl CheckContext {
    /// Creates a context wired to the real collaborators
    pub fn from_config(config: DiagnosticsConfig) -> Self {
        let database = PgDatabase::new(config.database.url.clone());
        Self {
            config: Arc::new(config),
            database: Arc::new(database),
            service_client: Arc::new(ReqwestServiceClient),
            broker: Arc::new(TcpBrokerConnector),
        }
    }

    pub fn with_database(mut self, database: impl Database + 'static) -> Self {
        self.database = Arc::new(database);
        self
    }

    pub fn with_service_client(mut self, client: impl ServiceClient + 'static) -> Self {
        self.service_client = Arc::new(client);
        self
    }

    pub fn with_broker(mut self, broker: impl BrokerConnector + 'static) -> Self {
        self.broker = Arc::new(broker);
        self
    }
}
