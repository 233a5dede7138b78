pub mod embedder;
pub mod intent;
pub mod seed;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod tools;
pub mod traits;

pub use embedder::Embedder;
pub use intent::{AiResponse, Intent, IntentService, QueryData};
pub use tools::{catalog, ToolInvocation};
pub use traits::{OperationalStore, TextEmbedder, ToolSelector};
