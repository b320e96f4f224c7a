use crate::output;
use crate::services::Services;
use anyhow::{Context, Result};
use tracing::warn;

pub async fn execute(services: &Services, json: bool) -> Result<String> {
    let report = services
        .orchestrator()
        .sync()
        .await
        .context("Sync aborted")?;

    if !report.is_clean() {
        warn!("{} files failed and will be retried next run", report.failed);
    }

    if json {
        output::sync_report_json(&report)
    } else {
        Ok(output::sync_report_text(&report))
    }
}
