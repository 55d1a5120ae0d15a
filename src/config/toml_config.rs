use crate::config::api_key_or_env;
use crate::core::agent::AgentSettings;
use crate::core::llm::{LlmSettings, ScreeningOptions, StructuredOptions};
use crate::core::{ConfigProvider, RoutingConfig, ScreeningConfig};
use crate::utils::error::{Result, ScreenerError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    pub dataset: DatasetConfig,
    pub screening: Option<ScreeningSection>,
    pub agent: Option<AgentSection>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub resumes_path: String,
    #[serde(default)]
    pub resume_ids: Vec<String>,
    pub max_resumes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningSection {
    pub prompt: String,
    pub output_schema: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    pub job_requirements_path: String,
    pub max_steps: Option<usize>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl WorkshopConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        let mut config: WorkshopConfig = toml::from_str(&processed)?;
        config.llm.api_key = api_key_or_env(Some(config.llm.api_key.as_str()));
        Ok(config)
    }

    /// 替換 `${VAR}`，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn screening_section(&self) -> Result<&ScreeningSection> {
        self.screening
            .as_ref()
            .ok_or_else(|| ScreenerError::MissingConfigError {
                field: "screening".to_string(),
            })
    }

    fn agent_section(&self) -> Result<&AgentSection> {
        self.agent
            .as_ref()
            .ok_or_else(|| ScreenerError::MissingConfigError {
                field: "agent".to_string(),
            })
    }

    pub fn validate_for_screening(&self) -> Result<()> {
        self.validate()?;
        let section = self.screening_section()?;
        validation::validate_non_empty("screening.prompt", &section.prompt)?;
        validation::validate_non_empty("screening.output_schema", &section.output_schema)?;
        validation::validate_temperature("screening.temperature", self.screening_temperature())?;
        validation::validate_at_least(
            "screening.max_tokens",
            self.screening_max_tokens() as usize,
            1,
        )?;
        Ok(())
    }

    pub fn validate_for_routing(&self) -> Result<()> {
        self.validate()?;
        let section = self.agent_section()?;
        validation::validate_path("agent.job_requirements_path", &section.job_requirements_path)?;
        validation::validate_range("agent.max_steps", self.max_steps(), 1, 50)?;
        validation::validate_temperature("agent.temperature", self.agent_temperature())?;
        validation::validate_at_least("agent.max_tokens", self.agent_max_tokens() as usize, 1)?;
        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for WorkshopConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_endpoint("llm.endpoint", &self.llm.endpoint)?;
        validation::validate_non_empty("llm.model", &self.llm.model)?;
        validation::validate_api_key("llm.api_key", &self.llm.api_key)?;
        validation::validate_at_least("llm.timeout_seconds", self.llm.timeout_seconds as usize, 1)?;
        validation::validate_path("dataset.resumes_path", &self.dataset.resumes_path)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_resume_ids("dataset.resume_ids", &self.dataset.resume_ids)?;
        if let Some(max) = self.dataset.max_resumes {
            validation::validate_at_least("dataset.max_resumes", max, 1)?;
        }
        Ok(())
    }
}

impl ConfigProvider for WorkshopConfig {
    fn resumes_path(&self) -> &str {
        &self.dataset.resumes_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn resume_ids(&self) -> &[String] {
        &self.dataset.resume_ids
    }

    fn max_resumes(&self) -> Option<usize> {
        self.dataset.max_resumes
    }
}

impl ScreeningConfig for WorkshopConfig {
    fn screening_prompt(&self) -> &str {
        self.screening.as_ref().map(|s| s.prompt.as_str()).unwrap_or_default()
    }

    fn output_schema(&self) -> &str {
        self.screening
            .as_ref()
            .map(|s| s.output_schema.as_str())
            .unwrap_or_default()
    }

    fn screening_temperature(&self) -> f64 {
        self.screening
            .as_ref()
            .and_then(|s| s.temperature)
            .unwrap_or(ScreeningOptions::default().temperature)
    }

    fn screening_max_tokens(&self) -> u32 {
        self.screening
            .as_ref()
            .and_then(|s| s.max_tokens)
            .unwrap_or(ScreeningOptions::default().max_tokens)
    }
}

impl RoutingConfig for WorkshopConfig {
    fn job_requirements_path(&self) -> &str {
        self.agent
            .as_ref()
            .map(|a| a.job_requirements_path.as_str())
            .unwrap_or_default()
    }

    fn max_steps(&self) -> usize {
        self.agent
            .as_ref()
            .and_then(|a| a.max_steps)
            .unwrap_or(AgentSettings::default().max_steps)
    }

    fn agent_temperature(&self) -> f64 {
        self.agent
            .as_ref()
            .and_then(|a| a.temperature)
            .unwrap_or(StructuredOptions::default().temperature)
    }

    fn agent_max_tokens(&self) -> u32 {
        self.agent
            .as_ref()
            .and_then(|a| a.max_tokens)
            .unwrap_or(StructuredOptions::default().max_tokens)
    }
}
