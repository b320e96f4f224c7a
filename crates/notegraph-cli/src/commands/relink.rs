use crate::output;
use crate::services::Services;
use anyhow::{Context, Result};
use serde_json::json;

pub async fn execute(services: &Services, json: bool) -> Result<String> {
    let edges = services
        .orchestrator()
        .relink()
        .await
        .context("Relink failed")?;

    if json {
        output::to_json(&json!({ "similar_edges": edges }))
    } else {
        Ok(format!("Relinked corpus: {edges} similar edges\n"))
    }
}
