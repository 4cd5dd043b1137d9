pub mod llm;
pub mod prompts;

pub use llm::{GenerationError, HttpLlmClient, LlmClient, StaticLlmClient};
