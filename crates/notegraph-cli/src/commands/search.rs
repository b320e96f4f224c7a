//! Retrieval commands

use crate::output;
use crate::services::Services;
use anyhow::{Context, Result};

pub async fn similar(services: &Services, query: &str, limit: usize, json: bool) -> Result<String> {
    let hits = services
        .retriever()
        .find_similar(query, limit)
        .await
        .with_context(|| format!("Search for \"{query}\" failed"))?;

    if json {
        output::to_json(&hits)
    } else {
        Ok(output::similar_text(&hits))
    }
}

pub async fn related(services: &Services, tag: &str, limit: usize, json: bool) -> Result<String> {
    let tag = tag.trim_start_matches('#');
    let related = services
        .retriever()
        .find_related_by_tag(tag, limit)
        .await
        .with_context(|| format!("Lookup of blocks related to #{tag} failed"))?;

    if json {
        output::to_json(&related)
    } else {
        Ok(output::related_text(tag, &related))
    }
}

pub async fn explore(services: &Services, content: &str, depth: usize, json: bool) -> Result<String> {
    let hits = services
        .retriever()
        .explore(content, depth)
        .await
        .context("Graph exploration failed")?;

    if json {
        output::to_json(&hits)
    } else {
        Ok(output::explore_text(content, &hits))
    }
}

pub async fn hybrid(
    services: &Services,
    query: &str,
    tags: &[String],
    limit: usize,
    json: bool,
) -> Result<String> {
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim_start_matches('#').to_string())
        .collect();
    let hits = services
        .retriever()
        .hybrid_search(query, &tags, limit)
        .await
        .with_context(|| format!("Hybrid search for \"{query}\" failed"))?;

    if json {
        output::to_json(&hits)
    } else {
        Ok(output::hybrid_text(&hits))
    }
}
