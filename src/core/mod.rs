pub mod agent;
pub mod engine;
pub mod layout;
pub mod llm;
pub mod prompt;
pub mod resumes;
pub mod tools;

pub use crate::domain::model::{
    AgentStep, AgentTranscript, LlmOutcome, Resume, RoutingReport, RunStatus, ScreeningReport,
    ScreeningRow, ToolOutcome, Usage,
};
pub use crate::domain::ports::{
    BatchSummary, CompletionRequest, ConfigProvider, LlmClient, Pipeline, RoutingConfig,
    ScreeningConfig, Storage,
};
pub use crate::utils::error::Result;
