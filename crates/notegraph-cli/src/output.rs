//! Rendering of command results as text or JSON

use anyhow::Result;
use notegraph_pipeline::{ExploreHit, HybridHit, RelatedBlock, Relation, SimilarBlock, SyncReport};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn sync_report_json(report: &SyncReport) -> Result<String> {
    let failures: Vec<String> = report.failures.iter().map(ToString::to_string).collect();
    to_json(&json!({
        "discovered": report.discovered,
        "processed": report.processed,
        "skipped": report.skipped,
        "removed": report.removed,
        "failed": report.failed,
        "blocks_written": report.blocks_written,
        "similar_edges": report.similar_edges,
        "duration_ms": report.duration.as_millis() as u64,
        "failures": failures,
    }))
}

pub fn sync_report_text(report: &SyncReport) -> String {
    let mut out = format!("Sync complete: {report}\n");
    for failure in &report.failures {
        let _ = writeln!(out, "  failed: {failure}");
    }
    out
}

pub fn similar_text(hits: &[SimilarBlock]) -> String {
    if hits.is_empty() {
        return "No matching blocks\n".to_string();
    }
    let mut out = String::new();
    for (rank, hit) in hits.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. [{:.3}] {}", rank + 1, hit.score, hit.content);
    }
    out
}

pub fn related_text(tag: &str, related: &[RelatedBlock]) -> String {
    if related.is_empty() {
        return format!("Nothing related to #{tag}\n");
    }
    let mut out = String::new();
    for block in related {
        let _ = write!(out, "{:>3}  {}", block.relevance, block.content);
        if !block.related_tags.is_empty() {
            let tags: Vec<String> = block.related_tags.iter().map(|t| format!("#{t}")).collect();
            let _ = write!(out, "  ({})", tags.join(" "));
        }
        out.push('\n');
    }
    out
}

fn describe_path(path: &[Relation]) -> String {
    path.iter()
        .map(|relation| match relation {
            Relation::Similar => "similar".to_string(),
            Relation::Tagged(tag) => format!("#{tag}"),
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub fn explore_text(start: &str, hits: &[ExploreHit]) -> String {
    if hits.is_empty() {
        return format!("No blocks reachable from \"{start}\"\n");
    }
    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(
            out,
            "{:>3}  {}  via {}",
            hit.distance,
            hit.content,
            describe_path(&hit.path)
        );
    }
    out
}

pub fn hybrid_text(hits: &[HybridHit]) -> String {
    if hits.is_empty() {
        return "No matching blocks\n".to_string();
    }
    let mut out = String::new();
    for (rank, hit) in hits.iter().enumerate() {
        let _ = write!(out, "{:>3}. [{:.3}] {}", rank + 1, hit.score, hit.content);
        if !hit.tags.is_empty() {
            let _ = write!(out, "  [{}]", hit.tags.join(", "));
        }
        out.push('\n');
    }
    out
}
