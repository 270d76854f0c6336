pub mod llm_service;
pub mod prompt;
pub mod question_provider;

pub use llm_service::{parse_question_batch, LlmService};
pub use prompt::build_prompt;
pub use question_provider::QuestionProvider;
