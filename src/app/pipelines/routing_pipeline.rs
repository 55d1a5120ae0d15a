use crate::app::pipelines::archive::build_zip;
use crate::core::agent::{AgentSettings, RoutingAgent};
use crate::core::resumes::{load_job_requirements, load_resumes};
use crate::core::tools::ToolContext;
use crate::core::{
    AgentTranscript, BatchSummary, LlmClient, Pipeline, Resume, RoutingConfig, RoutingReport,
    RunStatus, Storage, Usage,
};
use crate::utils::error::{Result, ScreenerError};
use std::sync::Arc;

pub const ROUTING_ARCHIVE: &str = "routing_results.zip";

impl BatchSummary for RoutingReport {
    fn processed(&self) -> usize {
        self.transcripts.len()
    }

    fn failed(&self) -> usize {
        self.transcripts
            .iter()
            .filter(|t| t.status != RunStatus::Completed)
            .count()
    }
}

pub struct RoutingPipeline<S: Storage, C: RoutingConfig, L: LlmClient> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: Arc<L>,
    today: Option<chrono::NaiveDate>,
}

impl<S: Storage, C: RoutingConfig, L: LlmClient> RoutingPipeline<S, C, L> {
    pub fn new(storage: S, config: C, client: L) -> Self {
        Self {
            storage,
            config,
            client: Arc::new(client),
            today: None,
        }
    }

    /// 固定工具使用的日期
    pub fn with_today(mut self, today: chrono::NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn agent(&self) -> RoutingAgent<Arc<L>> {
        let settings = AgentSettings {
            max_steps: self.config.max_steps(),
            temperature: self.config.agent_temperature(),
            max_tokens: self.config.agent_max_tokens(),
        };
        let agent = RoutingAgent::new(Arc::clone(&self.client), settings);
        match self.today {
            Some(today) => agent.with_tool_context(ToolContext::fixed(today)),
            None => agent,
        }
    }
}

pub fn routing_summary_csv(transcripts: &[AgentTranscript]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "candidate_id",
        "status",
        "steps",
        "final_action",
        "department",
        "error",
    ])?;

    for transcript in transcripts {
        let steps = transcript.steps.len().to_string();
        writer.write_record([
            transcript.candidate_id.as_str(),
            transcript.status.as_str(),
            steps.as_str(),
            transcript.final_action().unwrap_or_default(),
            transcript.department().unwrap_or_default(),
            transcript.error.as_deref().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ScreenerError::IoError(std::io::Error::other(e.to_string())))
}

#[async_trait::async_trait]
impl<S: Storage, C: RoutingConfig, L: LlmClient> Pipeline for RoutingPipeline<S, C, L> {
    type Output = RoutingReport;

    async fn extract(&self) -> Result<Vec<Resume>> {
        tracing::info!("📂 Loading resumes from {}", self.config.resumes_path());
        let book = load_resumes(self.config.resumes_path())?;
        book.select(self.config.resume_ids(), self.config.max_resumes())
    }

    async fn transform(&self, data: Vec<Resume>) -> Result<RoutingReport> {
        if data.is_empty() {
            tracing::info!("No candidates selected, skipping job requirements");
            return Ok(RoutingReport::default());
        }

        let job_requirements = load_job_requirements(self.config.job_requirements_path())?;
        tracing::debug!(
            "Job requirements loaded ({} chars)",
            job_requirements.chars().count()
        );

        let agent = self.agent();
        let mut transcripts = Vec::with_capacity(data.len());
        let mut usage = Usage::default();

        for resume in data {
            let transcript = agent
                .run(&resume.id, &resume.text, &job_requirements)
                .await;
            usage += transcript.usage;
            transcripts.push(transcript);
        }

        Ok(RoutingReport { transcripts, usage })
    }

    async fn load(&self, report: RoutingReport) -> Result<String> {
        let entries = vec![
            ("routing_summary.csv", routing_summary_csv(&report.transcripts)?),
            ("transcripts.json", serde_json::to_vec_pretty(&report)?),
        ];

        let zip_data = build_zip(&entries)?;
        self.storage.write_file(ROUTING_ARCHIVE, &zip_data).await?;

        tracing::info!("📦 Routing results saved ({} bytes)", zip_data.len());
        Ok(self.storage.location(ROUTING_ARCHIVE))
    }
}
