//! Database connectivity check

use tracing::info;

use crate::health::check::{CheckError, ErrorMessage};
use crate::health::context::CheckContext;

pub const VERSION_QUERY: &str = "SELECT version() AS postgresql_version";

pub async fn run(ctx: &CheckContext) -> Result<Vec<ErrorMessage>, CheckError> {
    match ctx.database.query(VERSION_QUERY).await {
        Ok(()) => {
            info!("Connection to database successful");
            Ok(Vec::new())
        }
        Err(e) => Ok(vec![ErrorMessage::new(format!(
            "Connection to database unsuccessful. <i>{e}</i>.<br> Please make sure the database is running and the environment variables are set correctly."
        ))]),
    }
}
