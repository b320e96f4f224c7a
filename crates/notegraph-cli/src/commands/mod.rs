pub mod relink;
pub mod search;
pub mod sync;

use crate::cli::Commands;
use crate::services::Services;
use anyhow::Result;

/// Run one command against opened services and return its rendered output
pub async fn run(services: &Services, command: Commands, json: bool) -> Result<String> {
    match command {
        Commands::Sync => sync::execute(services, json).await,
        Commands::Relink => relink::execute(services, json).await,
        Commands::Search { query, limit } => search::similar(services, &query, limit, json).await,
        Commands::Related { tag, limit } => search::related(services, &tag, limit, json).await,
        Commands::Explore { content, depth } => {
            search::explore(services, &content, depth, json).await
        }
        Commands::Hybrid { query, tags, limit } => {
            search::hybrid(services, &query, &tags, limit, json).await
        }
    }
}
