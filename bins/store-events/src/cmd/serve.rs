use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Effective;
use crate::error::GenError;

use super::wiring::build_runner;

pub async fn run(eff: Effective) -> Result<(), GenError> {
    tracing::info!("store-events starting");

    let runner = Arc::new(build_runner(&eff)?);

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- HTTP trigger ---
    let port = eff.api_port;
    let mut api_handle = tokio::spawn(trigger_api_server::run(port, runner, token.clone()));
    tracing::info!(port, "http trigger listening");

    tokio::select! {
        res = &mut api_handle => {
            return match res {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(GenError::Server(e)),
                Err(e) => Err(GenError::Server(format!("api task: {e}"))),
            };
        }
        sig = tokio::signal::ctrl_c() => sig?,
    }
    tracing::info!("shutting down...");

    // In-flight batches see the cancelled token at their next iteration.
    token.cancel();

    if tokio::time::timeout(std::time::Duration::from_secs(5), &mut api_handle).await.is_err() {
        tracing::warn!("api server did not stop in time, aborting");
        api_handle.abort();
    }

    tracing::info!("shutdown complete");
    Ok(())
}
