use crate::domain::model::{LlmOutcome, Resume};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// 對外顯示的輸出位置
    fn location(&self, path: &str) -> String;
}

/// Settings shared by every batch run over the resume dataset.
pub trait ConfigProvider: Send + Sync {
    fn resumes_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn resume_ids(&self) -> &[String];
    fn max_resumes(&self) -> Option<usize>;
}

pub trait ScreeningConfig: ConfigProvider {
    fn screening_prompt(&self) -> &str;
    fn output_schema(&self) -> &str;
    fn screening_temperature(&self) -> f64;
    fn screening_max_tokens(&self) -> u32;
}

pub trait RoutingConfig: ConfigProvider {
    fn job_requirements_path(&self) -> &str;
    fn max_steps(&self) -> usize;
    fn agent_temperature(&self) -> f64;
    fn agent_max_tokens(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// 提示詞長度（字元數）
    pub fn prompt_chars(&self) -> usize {
        self.prompt.chars().count()
    }
}

/// JSON-mode chat completion. Failures are reported inside the outcome, never as `Err`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete_json(&self, request: &CompletionRequest) -> LlmOutcome;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn complete_json(&self, request: &CompletionRequest) -> LlmOutcome {
        (**self).complete_json(request).await
    }
}

pub trait BatchSummary {
    fn processed(&self) -> usize;
    fn failed(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Output: BatchSummary + Send;

    async fn extract(&self) -> Result<Vec<Resume>>;
    async fn transform(&self, data: Vec<Resume>) -> Result<Self::Output>;
    async fn load(&self, output: Self::Output) -> Result<String>;
}
