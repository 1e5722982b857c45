//! Patavi companion service check
//!
//! Verifies the local credentials first. The network request is only made
//! once every credential is in place, so a missing file or key is never
//! followed by a second, misleading connection error.

use std::path::Path;

use reqwest::StatusCode;
use tracing::info;

use super::missing_files;
use crate::config::{PataviAuth, PataviConfig};
use crate::health::check::{CheckError, ErrorMessage};
use crate::health::context::{CheckContext, ClientIdentity, ServiceCredentials, ServiceRequest};

pub const API_KEY_MISSING: &str = "Patavi API key not found";

pub async fn run(ctx: &CheckContext) -> Result<Vec<ErrorMessage>, CheckError> {
    let config = &ctx.config.patavi;

    let credentials = match config.auth {
        PataviAuth::ApiKey => match config.api_key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => ServiceCredentials::ApiKey(key.to_string()),
            None => return Ok(vec![ErrorMessage::new(API_KEY_MISSING)]),
        },
        PataviAuth::ClientCertificate => {
            let errors = credential_file_errors(config);
            if !errors.is_empty() {
                return Ok(errors);
            }
            info!("All certificates found");
            ServiceCredentials::ClientCertificate(read_identity(config).await?)
        }
    };

    let request = ServiceRequest {
        url: config.url(),
        credentials,
    };

    let errors = match ctx.service_client.get(&request).await {
        Ok(status) if status == StatusCode::OK => {
            info!(url = %request.url, "Connection to Patavi server successful");
            Vec::new()
        }
        Ok(status) => vec![ErrorMessage::new(format!(
            "Connection to Patavi successful but received incorrect status code: <i>{}</i>.",
            status.as_u16()
        ))],
        Err(e) => vec![ErrorMessage::new(format!(
            "Connection to Patavi unsuccessful: <i>{e}</i>.<br> Please make sure the Patavi server is running and the environment variables are set correctly."
        ))],
    };

    Ok(errors)
}

fn credential_files(config: &PataviConfig) -> [(&'static str, Option<&Path>); 3] {
    [
        ("client key", config.client_key.as_deref()),
        ("client certificate", config.client_cert.as_deref()),
        ("certificate authority", config.ca.as_deref()),
    ]
}

/// One message per client credential file that is unset or absent
pub fn credential_file_errors(config: &PataviConfig) -> Vec<ErrorMessage> {
    missing_files(credential_files(config))
}

async fn read_identity(config: &PataviConfig) -> Result<ClientIdentity, CheckError> {
    Ok(ClientIdentity {
        key: read_credential(config.client_key.as_deref()).await?,
        certificate: read_credential(config.client_cert.as_deref()).await?,
        authority: read_credential(config.ca.as_deref()).await?,
    })
}

async fn read_credential(path: Option<&Path>) -> Result<Vec<u8>, CheckError> {
    let path = path.map(Path::to_path_buf).unwrap_or_default();
    tokio::fs::read(&path)
        .await
        .map_err(|source| CheckError::Credential {
            path: path.clone(),
            source,
        })
}
