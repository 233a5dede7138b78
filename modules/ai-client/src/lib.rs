pub mod error;
pub mod openai;
pub mod tool;
pub mod traits;

pub use error::AiError;
pub use openai::{tool_parameters, OpenAi};
pub use tool::{ToolCall, ToolDefinition};
pub use traits::EmbedAgent;
