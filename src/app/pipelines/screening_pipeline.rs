use crate::app::pipelines::archive::{build_zip, cell};
use crate::core::llm::{analyze_resume, ScreeningOptions};
use crate::core::resumes::load_resumes;
use crate::core::{
    BatchSummary, LlmClient, Pipeline, Resume, ScreeningConfig, ScreeningReport, ScreeningRow,
    Storage, Usage,
};
use crate::utils::error::{Result, ScreenerError};
use serde_json::Value;

pub const SCREENING_ARCHIVE: &str = "screening_results.zip";

impl BatchSummary for ScreeningReport {
    fn processed(&self) -> usize {
        self.rows.len()
    }

    fn failed(&self) -> usize {
        self.failures().count()
    }
}

/// 以 LLM 逐份分析履歷並輸出結構化結果
pub struct ScreeningPipeline<S: Storage, C: ScreeningConfig, L: LlmClient> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: L,
}

impl<S: Storage, C: ScreeningConfig, L: LlmClient> ScreeningPipeline<S, C, L> {
    pub fn new(storage: S, config: C, client: L) -> Self {
        Self {
            storage,
            config,
            client,
        }
    }
}

/// Column order: `ID`, result keys in first-seen order, then error and token counts.
pub fn screening_csv(report: &ScreeningReport) -> Result<Vec<u8>> {
    let mut keys: Vec<String> = Vec::new();
    for row in &report.rows {
        match &row.result {
            Some(Value::Object(map)) => {
                for key in map.keys() {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
            }
            Some(_) => {
                if !keys.iter().any(|k| k == "result") {
                    keys.push("result".to_string());
                }
            }
            None => {}
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["ID".to_string()];
    header.extend(keys.iter().cloned());
    header.extend(["error", "prompt_tokens", "completion_tokens"].map(String::from));
    writer.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![row.id.clone()];
        for key in &keys {
            let value = match &row.result {
                Some(Value::Object(map)) => map.get(key),
                Some(other) if key == "result" => Some(other),
                _ => None,
            };
            record.push(cell(value));
        }
        record.push(row.error.clone().unwrap_or_default());
        record.push(row.usage.prompt_tokens.to_string());
        record.push(row.usage.completion_tokens.to_string());
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ScreenerError::IoError(std::io::Error::other(e.to_string())))
}

#[async_trait::async_trait]
impl<S: Storage, C: ScreeningConfig, L: LlmClient> Pipeline for ScreeningPipeline<S, C, L> {
    type Output = ScreeningReport;

    async fn extract(&self) -> Result<Vec<Resume>> {
        tracing::info!("📂 Loading resumes from {}", self.config.resumes_path());
        let book = load_resumes(self.config.resumes_path())?;
        tracing::debug!("Dataset holds {} resumes", book.len());
        book.select(self.config.resume_ids(), self.config.max_resumes())
    }

    async fn transform(&self, data: Vec<Resume>) -> Result<ScreeningReport> {
        let options = ScreeningOptions {
            temperature: self.config.screening_temperature(),
            max_tokens: self.config.screening_max_tokens(),
        };
        let total = data.len();
        let mut rows = Vec::with_capacity(total);
        let mut usage = Usage::default();

        for (index, resume) in data.into_iter().enumerate() {
            tracing::info!("🔍 [{}/{}] Screening resume {}", index + 1, total, resume.id);
            let outcome = analyze_resume(
                &self.client,
                self.config.screening_prompt(),
                &resume.text,
                self.config.output_schema(),
                options,
            )
            .await;

            if let Some(error) = &outcome.error {
                tracing::warn!("⚠️ Resume {} failed: {}", resume.id, error);
            }
            usage += outcome.usage;
            rows.push(ScreeningRow {
                id: resume.id,
                result: outcome.result,
                error: outcome.error,
                usage: outcome.usage,
            });
        }

        tracing::info!(
            "✅ Screening complete: {} resumes, {} tokens",
            rows.len(),
            usage.total_tokens
        );
        Ok(ScreeningReport { rows, usage })
    }

    async fn load(&self, report: ScreeningReport) -> Result<String> {
        let csv_data = screening_csv(&report)?;
        let json_data = serde_json::to_vec_pretty(&report)?;

        let mut entries = vec![("screening.csv", csv_data), ("screening.json", json_data)];
        let failures: Vec<&ScreeningRow> = report.failures().collect();
        if !failures.is_empty() {
            entries.push(("failures.json", serde_json::to_vec_pretty(&failures)?));
        }

        let zip_data = build_zip(&entries)?;
        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(SCREENING_ARCHIVE, &zip_data).await?;

        Ok(self.storage.location(SCREENING_ARCHIVE))
    }
}
