use tokio_util::sync::CancellationToken;

use crate::config::Effective;
use crate::error::GenError;

use super::wiring::build_runner;

/// Один batch в настроенные sink'и, статистика в stdout.
pub async fn run(eff: Effective) -> Result<(), GenError> {
    let runner = build_runner(&eff)?;
    let count = eff.default_count;

    let token = CancellationToken::new();
    let watcher = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, stopping batch");
                token.cancel();
            }
        })
    };

    tracing::info!(count, "generating batch");
    let stats = runner.run(count, &token).await;
    watcher.abort();
    let stats = stats?;

    println!("{}", serde_json::to_string_pretty(&stats)?);

    if !stats.status {
        return Err(GenError::BatchFailed(
            stats.err_msg.unwrap_or_else(|| "unknown error".into()),
        ));
    }
    Ok(())
}
