use ai_client::{EmbedAgent, OpenAi};
use anyhow::{bail, Result};

use crate::traits::TextEmbedder;

/// OpenAI embeddings pinned to one model and one dimensionality.
///
/// Stored note vectors and query vectors must come from the same model; a
/// vector of any other length is rejected instead of being sent to the
/// similarity search.
pub struct Embedder {
    client: OpenAi,
    dimensions: usize,
}

impl Embedder {
    pub fn new(client: OpenAi, model: &str, dimensions: usize) -> Self {
        Self {
            client: client.with_embedding_model(model),
            dimensions,
        }
    }

    pub fn model(&self) -> &str {
        self.client.embedding_model()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait::async_trait]
impl TextEmbedder for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.embed(text).await?;
        check_dimensions(self.model(), &vector, self.dimensions)?;
        Ok(vector)
    }
}

fn check_dimensions(model: &str, vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        bail!(
            "embedding model {model} returned {} dimensions, expected {expected}",
            vector.len()
        );
    }
    Ok(())
}
