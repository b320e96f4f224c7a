//! Graph retrieval
//!
//! Read-only queries over the block graph: nearest neighbours of a text,
//! blocks two hops from a tag, bounded graph exploration and tag-filtered
//! vector search.

use crate::error::{RetrievalError, RetrievalResult};
use notegraph_core::{BatchEmbedder, BlockSummary, GraphReader};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Default result count for [`Retriever::find_related_by_tag`]
pub const DEFAULT_RELATED_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarBlock {
    pub content: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedBlock {
    pub content: String,
    pub related_tags: Vec<String>,
    /// Number of tag→block→block paths reaching this block
    pub relevance: usize,
}

/// One step of an exploration path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    /// A SIMILAR edge, one hop
    Similar,
    /// Two blocks sharing a tag, two hops
    Tagged(String),
}

impl Relation {
    pub fn hops(&self) -> usize {
        match self {
            Self::Similar => 1,
            Self::Tagged(_) => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreHit {
    pub content: String,
    /// Edges on the shortest path from the start block
    pub distance: usize,
    pub path: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridHit {
    pub content: String,
    pub score: f32,
    pub tags: Vec<String>,
}

pub struct Retriever {
    reader: Arc<dyn GraphReader>,
    embedder: Arc<dyn BatchEmbedder>,
}

impl Retriever {
    pub fn new(reader: Arc<dyn GraphReader>, embedder: Arc<dyn BatchEmbedder>) -> Self {
        Self { reader, embedder }
    }

    async fn embed_query(&self, query: &str) -> RetrievalResult<Vec<f32>> {
        self.embedder
            .embed(vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(RetrievalError::EmptyEmbedding)
    }

    /// Blocks nearest to `query`, best first
    pub async fn find_similar(&self, query: &str, limit: usize) -> RetrievalResult<Vec<SimilarBlock>> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embed_query(query).await?;
        let hits = self.reader.nearest_blocks(&vector, limit, &[]).await?;
        Ok(hits
            .into_iter()
            .map(|hit| SimilarBlock {
                content: hit.content,
                score: hit.score,
            })
            .collect())
    }

    /// Blocks reached by Tag ← TAGGED ← Block - SIMILAR - Block, ranked by
    /// the number of such paths
    pub async fn find_related_by_tag(
        &self,
        tag: &str,
        limit: usize,
    ) -> RetrievalResult<Vec<RelatedBlock>> {
        let tagged = self.reader.blocks_tagged(tag).await?;
        if tagged.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = tagged.iter().map(|b| b.key.clone()).collect();
        let edges = self.reader.similar_edges(&keys).await?;

        let mut paths: HashMap<String, usize> = HashMap::new();
        for block in &tagged {
            for edge in &edges {
                if let Some(other) = edge.other(&block.key) {
                    *paths.entry(other.to_string()).or_default() += 1;
                }
            }
        }

        let related_keys: Vec<String> = paths.keys().cloned().collect();
        let summaries = self.reader.blocks_by_keys(&related_keys).await?;

        let mut related: Vec<RelatedBlock> = summaries
            .into_iter()
            .map(|summary| {
                let tags: BTreeSet<String> = summary.tags.into_iter().collect();
                RelatedBlock {
                    relevance: paths.get(&summary.key).copied().unwrap_or_default(),
                    content: summary.content,
                    related_tags: tags.into_iter().collect(),
                }
            })
            .collect();
        related.sort_by(|a, b| {
            b.relevance
                .cmp(&a.relevance)
                .then_with(|| a.content.cmp(&b.content))
        });
        related.truncate(limit);

        debug!(
            "Tag '{}': {} tagged blocks, {} related",
            tag,
            tagged.len(),
            related.len()
        );
        Ok(related)
    }

    /// Every block within `max_depth` edges of the block with content
    /// `start`, with its shortest distance and the relations along that path.
    ///
    /// A SIMILAR edge counts one edge, a shared tag two (block → tag → block).
    /// Results are sorted by distance, then content; the start block itself is
    /// not reported.
    pub async fn explore(&self, start: &str, max_depth: usize) -> RetrievalResult<Vec<ExploreHit>> {
        let Some(origin) = self.reader.block_by_content(start).await? else {
            return Ok(Vec::new());
        };

        let mut summaries: HashMap<String, BlockSummary> = HashMap::new();
        let mut best: HashMap<String, (usize, Vec<Relation>)> = HashMap::new();
        let mut frontier = BinaryHeap::new();

        best.insert(origin.key.clone(), (0, Vec::new()));
        frontier.push(Reverse((0usize, origin.key.clone())));
        summaries.insert(origin.key.clone(), origin.clone());

        while let Some(Reverse((distance, key))) = frontier.pop() {
            let Some((settled, path)) = best.get(&key).cloned() else {
                continue;
            };
            if settled < distance {
                continue;
            }

            for (neighbour, relation) in self.neighbours(&key, &mut summaries).await? {
                let next = distance + relation.hops();
                if next > max_depth {
                    continue;
                }
                let improves = best.get(&neighbour).map_or(true, |(d, _)| next < *d);
                if improves {
                    let mut next_path = path.clone();
                    next_path.push(relation);
                    best.insert(neighbour.clone(), (next, next_path));
                    frontier.push(Reverse((next, neighbour)));
                }
            }
        }

        let mut hits: Vec<ExploreHit> = best
            .into_iter()
            .filter(|(key, _)| *key != origin.key)
            .filter_map(|(key, (distance, path))| {
                summaries.get(&key).map(|summary| ExploreHit {
                    content: summary.content.clone(),
                    distance,
                    path,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then_with(|| a.content.cmp(&b.content))
        });
        Ok(hits)
    }

    /// Adjacent blocks of `key`, in a stable order
    async fn neighbours(
        &self,
        key: &str,
        summaries: &mut HashMap<String, BlockSummary>,
    ) -> RetrievalResult<Vec<(String, Relation)>> {
        let mut adjacent = Vec::new();

        let edges = self.reader.similar_edges(&[key.to_string()]).await?;
        let mut similar: Vec<String> = edges
            .iter()
            .filter_map(|edge| edge.other(key))
            .map(str::to_string)
            .collect();
        similar.sort();
        similar.dedup();

        let unknown: Vec<String> = similar
            .iter()
            .filter(|k| !summaries.contains_key(*k))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            for summary in self.reader.blocks_by_keys(&unknown).await? {
                summaries.insert(summary.key.clone(), summary);
            }
        }
        adjacent.extend(similar.into_iter().map(|k| (k, Relation::Similar)));

        let mut tags = summaries
            .get(key)
            .map(|s| s.tags.clone())
            .unwrap_or_default();
        tags.sort();
        tags.dedup();
        for tag in tags {
            let mut tagged = self.reader.blocks_tagged(&tag).await?;
            tagged.sort_by(|a, b| a.key.cmp(&b.key));
            for block in tagged {
                if block.key == key {
                    continue;
                }
                adjacent.push((block.key.clone(), Relation::Tagged(tag.clone())));
                summaries.entry(block.key.clone()).or_insert(block);
            }
        }

        Ok(adjacent)
    }

    /// Vector search restricted to blocks carrying at least one of `tags`
    /// (unrestricted when `tags` is empty)
    pub async fn hybrid_search(
        &self,
        query: &str,
        tags: &[String],
        limit: usize,
    ) -> RetrievalResult<Vec<HybridHit>> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embed_query(query).await?;
        let hits = self.reader.nearest_blocks(&vector, limit, tags).await?;
        Ok(hits
            .into_iter()
            .map(|hit| HybridHit {
                content: hit.content,
                score: hit.score,
                tags: hit.tags,
            })
            .collect())
    }
}
