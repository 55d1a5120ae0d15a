use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Add, AddAssign};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: String,
    pub text: String,
    pub html: String,
}

/// Token 使用量，缺少的欄位視為 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            total_tokens: self.total_tokens + rhs.total_tokens,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        *self = *self + rhs;
    }
}

/// Outcome of one JSON-mode completion. Exactly one of `result`/`error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmOutcome {
    pub result: Option<Value>,
    pub error: Option<String>,
    pub usage: Usage,
}

impl LlmOutcome {
    pub fn success(result: Value, usage: Usage) -> Self {
        Self {
            result: Some(result),
            error: None,
            usage,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
            usage: Usage::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRow {
    pub id: String,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningReport {
    pub rows: Vec<ScreeningRow>,
    pub usage: Usage,
}

impl ScreeningReport {
    pub fn failures(&self) -> impl Iterator<Item = &ScreeningRow> {
        self.rows.iter().filter(|row| row.error.is_some())
    }
}

/// 工具執行結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub status: String,
    pub message: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ToolOutcome {
    pub fn is_final(&self) -> bool {
        self.details
            .get("final")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStep {
    pub index: usize,
    pub reasoning: String,
    pub tool: String,
    pub arguments: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ToolOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    StepLimitReached,
    LlmFailed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::StepLimitReached => "step_limit_reached",
            RunStatus::LlmFailed => "llm_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTranscript {
    pub candidate_id: String,
    pub status: RunStatus,
    pub steps: Vec<AgentStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub usage: Usage,
}

impl AgentTranscript {
    /// 最後一個成功執行、且不是 `done` 的工具
    pub fn final_action(&self) -> Option<&str> {
        self.steps
            .iter()
            .rev()
            .filter(|step| step.outcome.is_some() && step.tool != "done")
            .map(|step| step.tool.as_str())
            .next()
    }

    pub fn department(&self) -> Option<&str> {
        self.steps
            .iter()
            .rev()
            .filter(|step| step.tool == "route_to_department")
            .filter_map(|step| step.outcome.as_ref())
            .filter_map(|outcome| outcome.details.get("department"))
            .filter_map(Value::as_str)
            .next()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutingReport {
    pub transcripts: Vec<AgentTranscript>,
    pub usage: Usage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(index: usize, tool: &str, outcome: Option<Value>) -> AgentStep {
        AgentStep {
            index,
            reasoning: String::new(),
            tool: tool.to_string(),
            arguments: Map::new(),
            outcome: outcome.map(|v| serde_json::from_value(v).unwrap()),
            error: None,
        }
    }

    #[test]
    fn test_usage_accumulates() {
        let mut total = Usage::default();
        total += Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        };
        total += Usage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        };
        assert_eq!(total.prompt_tokens, 11);
        assert_eq!(total.total_tokens, 18);
    }

    #[test]
    fn test_usage_tolerates_missing_fields() {
        let usage: Usage = serde_json::from_value(json!({"prompt_tokens": 7})).unwrap();
        assert_eq!(usage.prompt_tokens, 7);
        assert_eq!(usage.completion_tokens, 0);
    }

    #[test]
    fn test_transcript_final_action_skips_done_and_failures() {
        let transcript = AgentTranscript {
            candidate_id: "42".to_string(),
            status: RunStatus::Completed,
            steps: vec![
                step(
                    0,
                    "route_to_department",
                    Some(json!({
                        "status": "success",
                        "message": "m",
                        "department": "internship",
                        "reason": "r"
                    })),
                ),
                step(1, "send_email", None),
                step(
                    2,
                    "done",
                    Some(json!({"status": "success", "message": "m", "final": true})),
                ),
            ],
            error: None,
            usage: Usage::default(),
        };

        assert_eq!(transcript.final_action(), Some("route_to_department"));
        assert_eq!(transcript.department(), Some("internship"));
        assert!(transcript.steps[2].outcome.as_ref().unwrap().is_final());
    }
}
