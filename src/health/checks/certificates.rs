//! Server-side certificate presence check

use std::path::Path;

use tracing::info;

use super::missing_files;
use crate::health::check::{CheckError, ErrorMessage};
use crate::health::context::CheckContext;

/// Files expected in the certificate directory, with their display labels
pub const SERVER_FILES: [(&str, &str); 3] = [
    ("server key", "server-key.pem"),
    ("server certificate", "server-crt.pem"),
    ("certificate authority", "ca-crt.pem"),
];

pub async fn run(ctx: &CheckContext) -> Result<Vec<ErrorMessage>, CheckError> {
    let dir = &ctx.config.certificates.dir;
    let errors = server_certificate_errors(dir);
    if errors.is_empty() {
        info!(dir = %dir.display(), "All certificates found");
    }
    Ok(errors)
}

/// One message per server file missing from `dir`
pub fn server_certificate_errors(dir: &Path) -> Vec<ErrorMessage> {
    let paths: Vec<_> = SERVER_FILES
        .iter()
        .map(|(label, file)| (*label, dir.join(file)))
        .collect();
    missing_files(
        paths
            .iter()
            .map(|(label, path)| (*label, Some(path.as_path()))),
    )
}
