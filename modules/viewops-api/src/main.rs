use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use viewops_api::{build_router, AppState};
use viewops_common::Config;
use viewops_core::{Embedder, IntentService};
use viewops_graphql::GraphqlClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("viewops=info".parse()?))
        .init();

    let config = Config::from_env();
    config.log_redacted();

    let openai = OpenAi::new(&config.openai_api_key, &config.chat_model);
    let embedder = Embedder::new(
        openai.clone(),
        &config.embedding_model,
        config.embedding_dimensions,
    );
    let store = GraphqlClient::new(&config.hasura_endpoint, &config.hasura_admin_secret);

    let service = IntentService::new(Arc::new(openai), Arc::new(embedder), Arc::new(store));
    let app = build_router(Arc::new(AppState::new(service)));

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("ViewOps API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
