use crate::utils::error::{Result, ScreenerError};
use std::collections::HashSet;
use url::Url;

pub const MAX_TEMPERATURE: f64 = 2.0;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ScreenerError {
    ScreenerError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// LLM 端點必須是 http(s) URL
pub fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(invalid(field, endpoint, "endpoint cannot be empty"));
    }
    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field,
            endpoint,
            format!("unsupported scheme '{}', expected http or https", scheme),
        )),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "path contains null bytes"));
    }
    Ok(())
}

pub fn validate_at_least(field: &str, value: usize, min: usize) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("must be at least {}", min)));
    }
    Ok(())
}

pub fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "cannot be empty or whitespace-only"));
    }
    Ok(())
}

/// API 金鑰不可為空，也不可殘留未替換的 `${VAR}`
pub fn validate_api_key(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScreenerError::MissingConfigError {
            field: field.to_string(),
        });
    }
    if value.starts_with("${") && value.ends_with('}') {
        return Err(ScreenerError::ConfigValidationError {
            field: field.to_string(),
            message: format!("environment variable {} is not set", value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field, value, format!("must be between {} and {}", min, max)));
    }
    Ok(())
}

pub fn validate_temperature(field: &str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(invalid(field, value, "temperature must be a number"));
    }
    validate_range(field, value, 0.0, MAX_TEMPERATURE)
}

/// 指定的履歷 ID 不可空白或重複
pub fn validate_resume_ids(field: &str, ids: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(invalid(field, ids.join(","), "resume IDs cannot be blank"));
        }
        if !seen.insert(id.trim()) {
            return Err(invalid(field, id, "resume ID listed more than once"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint(
            "llm.endpoint",
            "https://openrouter.ai/api/v1/chat/completions"
        )
        .is_ok());
        assert!(validate_endpoint("llm.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_endpoint("llm.endpoint", "").is_err());
        assert!(validate_endpoint("llm.endpoint", "openrouter.ai").is_err());
        assert!(validate_endpoint("llm.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_api_key() {
        assert!(validate_api_key("llm.api_key", "sk-or-123").is_ok());
        assert!(matches!(
            validate_api_key("llm.api_key", "  "),
            Err(ScreenerError::MissingConfigError { .. })
        ));
        assert!(matches!(
            validate_api_key("llm.api_key", "${OPENROUTER_API_KEY}"),
            Err(ScreenerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_temperature() {
        assert!(validate_temperature("screening.temperature", 0.3).is_ok());
        assert!(validate_temperature("screening.temperature", 0.0).is_ok());
        assert!(validate_temperature("screening.temperature", 2.5).is_err());
        assert!(validate_temperature("screening.temperature", f64::NAN).is_err());
        assert!(validate_range("agent.max_steps", 0usize, 1, 50).is_err());
    }

    #[test]
    fn test_validate_at_least() {
        assert!(validate_at_least("max_tokens", 1500, 1).is_ok());
        assert!(validate_at_least("max_tokens", 0, 1).is_err());
    }

    #[test]
    fn test_validate_resume_ids() {
        let ids = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(validate_resume_ids("dataset.resume_ids", &[]).is_ok());
        assert!(validate_resume_ids("dataset.resume_ids", &ids(&["1001", "1002"])).is_ok());
        assert!(validate_resume_ids("dataset.resume_ids", &ids(&["1001", " "])).is_err());
        assert!(validate_resume_ids("dataset.resume_ids", &ids(&["1001", "1001"])).is_err());
    }
}
