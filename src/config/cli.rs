use crate::config::api_key_or_env;
use crate::core::llm::{LlmSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECONDS};
use crate::core::{ConfigProvider, ScreeningConfig};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

const DEFAULT_PROMPT: &str = "Analyze this resume and extract the candidate's key qualifications.";
const DEFAULT_SCHEMA: &str = r#"{
  "name": "string",
  "years_of_experience": "number",
  "top_skills": ["string"],
  "seniority": "junior | mid | senior",
  "summary": "string - one sentence"
}"#;

#[derive(Debug, Clone, Parser)]
#[command(name = "resume-screener")]
#[command(about = "Screen resumes with an LLM and export structured results")]
pub struct CliConfig {
    /// Resume CSV with ID, Resume_str and Resume_html columns
    #[arg(long, default_value = "data/Resume.csv")]
    pub resumes: String,

    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// JSON structure the model should return
    #[arg(long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Only screen these resume IDs
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    #[arg(long)]
    pub max_resumes: Option<usize>,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Falls back to OPENROUTER_API_KEY
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long, default_value_t = 0.3)]
    pub temperature: f64,

    #[arg(long, default_value_t = 1500)]
    pub max_tokens: u32,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            endpoint: self.endpoint.clone(),
            api_key: api_key_or_env(self.api_key.as_deref()),
            model: self.model.clone(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn resumes_path(&self) -> &str {
        &self.resumes
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn resume_ids(&self) -> &[String] {
        &self.ids
    }

    fn max_resumes(&self) -> Option<usize> {
        self.max_resumes
    }
}

impl ScreeningConfig for CliConfig {
    fn screening_prompt(&self) -> &str {
        &self.prompt
    }

    fn output_schema(&self) -> &str {
        &self.schema
    }

    fn screening_temperature(&self) -> f64 {
        self.temperature
    }

    fn screening_max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("resumes", &self.resumes)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty("prompt", &self.prompt)?;
        validation::validate_non_empty("schema", &self.schema)?;
        validation::validate_endpoint("endpoint", &self.endpoint)?;
        validation::validate_api_key("api_key", &self.llm_settings().api_key)?;
        validation::validate_temperature("temperature", self.temperature)?;
        validation::validate_at_least("max_tokens", self.max_tokens as usize, 1)?;
        validation::validate_resume_ids("ids", &self.ids)?;
        if let Some(max) = self.max_resumes {
            validation::validate_at_least("max_resumes", max, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_id_list() {
        let config = CliConfig::parse_from([
            "resume-screener",
            "--ids",
            "10,20",
            "--api-key",
            "sk-test",
        ]);

        assert_eq!(config.resume_ids(), &["10".to_string(), "20".to_string()]);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.screening_max_tokens(), 1500);
        assert!((config.screening_temperature() - 0.3).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
        assert_eq!(config.llm_settings().api_key, "sk-test");
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let config = CliConfig::parse_from([
            "resume-screener",
            "--api-key",
            "sk-test",
            "--temperature",
            "3.5",
        ]);
        assert!(config.validate().is_err());
    }
}
