pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;
pub use crate::config::WorkshopConfig;

pub use crate::adapters::storage::LocalStorage;
pub use crate::app::pipelines::{RoutingPipeline, ScreeningPipeline};
pub use crate::core::{
    agent::{AgentSettings, RoutingAgent},
    engine::BatchEngine,
    llm::{LlmSettings, OpenRouterClient},
};
pub use crate::utils::error::{Result, ScreenerError};
