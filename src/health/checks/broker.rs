//! Message broker connectivity check

use tracing::info;

use crate::health::check::{CheckError, ErrorMessage};
use crate::health::context::CheckContext;

pub async fn run(ctx: &CheckContext) -> Result<Vec<ErrorMessage>, CheckError> {
    let url = ctx.config.broker.url();
    match ctx.broker.connect(&url).await {
        Ok(()) => {
            info!(%url, "AMQP connection to Rabbit successful");
            Ok(Vec::new())
        }
        Err(e) => Ok(vec![ErrorMessage::new(format!(
            "AMQP connection to Rabbit unsuccessful. <i>{e}</i>.<br> Please make sure the Rabbit is running and the environment variables are set correctly."
        ))]),
    }
}
