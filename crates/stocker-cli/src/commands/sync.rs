use std::sync::Arc;

use stocker_core::config::StockerConfig;
use stocker_core::{AccountId, DatabaseService, SynchronizationEngine};

use crate::error::CliError;

pub async fn run_sync(
    db: &DatabaseService,
    config: &StockerConfig,
    account_id: AccountId,
    as_json: bool,
) -> Result<(), CliError> {
    let client = config.qiita_client()?;
    let engine = SynchronizationEngine::new(db.clone(), Arc::new(client))
        .with_concurrency(config.sync_concurrency);

    let report = engine.synchronize(account_id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Sync completed: {} stocks ({} new, {} updated, {} unchanged)",
            report.fetched, report.inserted, report.updated, report.unchanged
        );
    }
    Ok(())
}
