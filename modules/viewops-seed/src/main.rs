use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use viewops_common::Config;
use viewops_core::seed::{sample_notes, seed_notes};
use viewops_core::Embedder;
use viewops_graphql::GraphqlClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("viewops=info".parse()?))
        .init();

    let config = Config::from_env();
    config.log_redacted();

    let openai = OpenAi::new(&config.openai_api_key, &config.chat_model);
    let embedder = Embedder::new(openai, &config.embedding_model, config.embedding_dimensions);
    let store = GraphqlClient::new(&config.hasura_endpoint, &config.hasura_admin_secret);

    let notes = sample_notes();
    info!(count = notes.len(), "Seeding operational notes");

    let report = seed_notes(&embedder, &store, &notes).await;
    if report.all_failed() {
        bail!("all {} notes failed to seed", report.failed);
    }

    info!(
        inserted = report.inserted,
        failed = report.failed,
        "Seeding complete"
    );
    Ok(())
}
