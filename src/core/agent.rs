use crate::core::llm::{structured_call, StructuredOptions};
use crate::core::tools::{describe_tools, invoke, ToolContext, ToolKind};
use crate::domain::model::{AgentStep, AgentTranscript, RunStatus, Usage};
use crate::domain::ports::LlmClient;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    pub max_steps: usize,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: 8,
            temperature: 0.2,
            max_tokens: 2000,
        }
    }
}

/// 模型每一步回傳的決策
#[derive(Debug, Clone, PartialEq)]
struct Decision {
    reasoning: String,
    tool: Option<String>,
    arguments: Map<String, Value>,
}

impl Decision {
    fn from_value(value: &Value) -> Self {
        let tool = value
            .get("tool")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self {
            reasoning: value
                .get("reasoning")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            tool,
            arguments: value
                .get("arguments")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

fn decision_schema() -> Value {
    json!({
        "reasoning": "string - Brief explanation of why this action is appropriate",
        "tool": "string - Name of the tool to call",
        "arguments": {"candidate_id": "string", "<parameter>": "string"}
    })
}

fn instructions() -> String {
    format!(
        "You are an application routing agent for a hiring team. Review the candidate's resume \
against the job requirements and choose the single next action to take. Review the actions \
already taken before choosing; do not repeat an action that already succeeded. When no further \
automated action is needed, call `done`.\n\nAVAILABLE TOOLS:\n{}",
        describe_tools()
    )
}

pub struct RoutingAgent<L: LlmClient> {
    client: L,
    settings: AgentSettings,
    tool_context: ToolContext,
}

impl<L: LlmClient> RoutingAgent<L> {
    pub fn new(client: L, settings: AgentSettings) -> Self {
        Self {
            client,
            settings,
            tool_context: ToolContext::today(),
        }
    }

    pub fn with_tool_context(mut self, tool_context: ToolContext) -> Self {
        self.tool_context = tool_context;
        self
    }

    pub async fn run(
        &self,
        candidate_id: &str,
        resume_text: &str,
        job_requirements: &str,
    ) -> AgentTranscript {
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut usage = Usage::default();
        let options = StructuredOptions {
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        let instructions = instructions();
        let schema = decision_schema();

        tracing::info!("🤖 Routing candidate {}", candidate_id);

        for index in 0..self.settings.max_steps {
            let history = serde_json::to_value(&steps).unwrap_or_else(|_| json!([]));
            let context = [
                ("candidate_id", json!(candidate_id)),
                ("job_requirements", json!(job_requirements)),
                ("resume", json!(resume_text)),
                ("actions_taken", history),
            ];

            let outcome =
                structured_call(&self.client, &instructions, &context, &schema, options).await;
            usage += outcome.usage;

            let Some(result) = outcome.result else {
                let error = outcome
                    .error
                    .unwrap_or_else(|| "LLM returned no result".to_string());
                tracing::warn!("❌ Candidate {}: LLM call failed: {}", candidate_id, error);
                return AgentTranscript {
                    candidate_id: candidate_id.to_string(),
                    status: RunStatus::LlmFailed,
                    steps,
                    error: Some(error),
                    usage,
                };
            };

            let decision = Decision::from_value(&result);
            let step = self.execute(index, candidate_id, decision);
            let finished = step.outcome.as_ref().is_some_and(|o| o.is_final());
            steps.push(step);

            if finished {
                tracing::info!(
                    "✅ Candidate {} processed in {} steps",
                    candidate_id,
                    steps.len()
                );
                return AgentTranscript {
                    candidate_id: candidate_id.to_string(),
                    status: RunStatus::Completed,
                    steps,
                    error: None,
                    usage,
                };
            }
        }

        tracing::warn!(
            "⏱️ Candidate {} hit the step limit ({})",
            candidate_id,
            self.settings.max_steps
        );
        AgentTranscript {
            candidate_id: candidate_id.to_string(),
            status: RunStatus::StepLimitReached,
            steps,
            error: None,
            usage,
        }
    }

    fn execute(&self, index: usize, candidate_id: &str, decision: Decision) -> AgentStep {
        let Decision {
            reasoning,
            tool,
            mut arguments,
        } = decision;

        let mut step = AgentStep {
            index,
            reasoning,
            tool: tool.clone().unwrap_or_default(),
            arguments: Map::new(),
            outcome: None,
            error: None,
        };

        let Some(tool_name) = tool else {
            step.error = Some("decision did not name a tool".to_string());
            step.arguments = arguments;
            return step;
        };

        // 一律以目前處理中的候選人為準
        match arguments.get("candidate_id").and_then(Value::as_str) {
            Some(id) if id == candidate_id => {}
            Some(id) => {
                tracing::warn!(
                    "Decision targeted candidate {} while reviewing {}; overriding",
                    id,
                    candidate_id
                );
                arguments.insert("candidate_id".to_string(), json!(candidate_id));
            }
            None => {
                arguments.insert("candidate_id".to_string(), json!(candidate_id));
            }
        }

        match ToolKind::from_name(&tool_name) {
            Some(kind) => match invoke(kind, &arguments, &self.tool_context) {
                Ok(outcome) => step.outcome = Some(outcome),
                Err(e) => {
                    tracing::debug!("Step {} failed: {}", index, e);
                    step.error = Some(e.to_string());
                }
            },
            None => {
                tracing::debug!("Unknown tool requested: {}", tool_name);
                step.error = Some(format!("unknown tool '{}'", tool_name));
            }
        }

        step.arguments = arguments;
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::LlmOutcome;
    use crate::domain::ports::CompletionRequest;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 依序回傳預先排好的回應
    struct ScriptedLlm {
        replies: Mutex<VecDeque<LlmOutcome>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<LlmOutcome>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete_json(&self, request: &CompletionRequest) -> LlmOutcome {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| LlmOutcome::failure("script exhausted"))
        }
    }

    fn reply(value: Value) -> LlmOutcome {
        LlmOutcome::success(
            value,
            Usage {
                prompt_tokens: 100,
                completion_tokens: 20,
                total_tokens: 120,
            },
        )
    }

    fn agent(replies: Vec<LlmOutcome>, max_steps: usize) -> RoutingAgent<ScriptedLlm> {
        RoutingAgent::new(
            ScriptedLlm::new(replies),
            AgentSettings {
                max_steps,
                ..AgentSettings::default()
            },
        )
        .with_tool_context(ToolContext::fixed(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_agent_routes_then_finishes() {
        let agent = agent(
            vec![
                reply(json!({
                    "reasoning": "Strong backend background",
                    "tool": "route_to_department",
                    "arguments": {"department": "senior_engineering", "reason": "8 years Rust"}
                })),
                reply(json!({
                    "reasoning": "Invite to assessment",
                    "tool": "schedule_technical_assessment",
                    "arguments": {"candidate_id": "101", "assessment_type": "system_design"}
                })),
                reply(json!({"reasoning": "Nothing left", "tool": "done", "arguments": {}})),
            ],
            8,
        );

        let transcript = agent.run("101", "Senior Rust engineer", "Rust, 5+ years").await;

        assert_eq!(transcript.status, RunStatus::Completed);
        assert_eq!(transcript.steps.len(), 3);
        assert_eq!(transcript.steps[0].arguments["candidate_id"], "101");
        assert_eq!(transcript.department(), Some("senior_engineering"));
        assert_eq!(
            transcript.final_action(),
            Some("schedule_technical_assessment")
        );
        assert_eq!(transcript.usage.total_tokens, 360);

        let prompts = agent.client.prompts.lock().unwrap();
        assert!(prompts[0].contains("\nACTIONS_TAKEN:\n[]\n"));
        assert!(prompts[1].contains("Candidate 101 routed to senior_engineering"));
        assert!(prompts[0].contains("AVAILABLE TOOLS:\n- schedule_technical_assessment"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_recorded_and_loop_continues() {
        let agent = agent(
            vec![
                reply(json!({"tool": "hire_immediately", "arguments": {}})),
                reply(json!({"reasoning": "no tool"})),
                reply(json!({"tool": "done"})),
            ],
            5,
        );

        let transcript = agent.run("7", "resume", "reqs").await;

        assert_eq!(transcript.status, RunStatus::Completed);
        assert_eq!(
            transcript.steps[0].error.as_deref(),
            Some("unknown tool 'hire_immediately'")
        );
        assert_eq!(
            transcript.steps[1].error.as_deref(),
            Some("decision did not name a tool")
        );
        assert_eq!(transcript.final_action(), None);
    }

    #[tokio::test]
    async fn test_mismatched_candidate_id_is_overridden() {
        let agent = agent(
            vec![
                reply(json!({
                    "tool": "request_additional_info",
                    "arguments": {"candidate_id": "999", "info_needed": "Degree details"}
                })),
                reply(json!({"tool": "done"})),
            ],
            5,
        );

        let transcript = agent.run("12", "resume", "reqs").await;

        let outcome = transcript.steps[0].outcome.as_ref().unwrap();
        assert_eq!(outcome.message, "Additional info requested from candidate 12");
        assert_eq!(outcome.details["request_sent_date"], "2024-02-01");
    }

    #[tokio::test]
    async fn test_llm_failure_stops_run() {
        let agent = agent(
            vec![
                reply(json!({
                    "tool": "flag_for_manual_review",
                    "arguments": {"concern": "Unclear dates"}
                })),
                LlmOutcome::failure("API returned HTTP 503: overloaded"),
            ],
            5,
        );

        let transcript = agent.run("4", "resume", "reqs").await;

        assert_eq!(transcript.status, RunStatus::LlmFailed);
        assert_eq!(transcript.steps.len(), 1);
        assert!(transcript.error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_step_limit_reached() {
        let repeated = (0..3)
            .map(|_| {
                reply(json!({
                    "tool": "send_email",
                    "arguments": {"template": "request_info"}
                }))
            })
            .collect();
        let agent = agent(repeated, 3);

        let transcript = agent.run("8", "resume", "reqs").await;

        assert_eq!(transcript.status, RunStatus::StepLimitReached);
        assert_eq!(transcript.steps.len(), 3);
        assert_eq!(transcript.final_action(), Some("send_email"));
    }
}
