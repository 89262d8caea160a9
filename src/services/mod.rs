pub mod generation;
pub mod key_store;
pub mod llm_service;
pub mod prompt;
pub mod report_writer;

pub use generation::GenerationClient;
pub use key_store::KeyStore;
pub use llm_service::{CompletionBackend, CompletionRequest, LlmService, ProviderFailure};
pub use report_writer::ReportWriter;
