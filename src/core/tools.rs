use crate::domain::model::ToolOutcome;
use crate::utils::error::{Result, ScreenerError};
use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Map, Value};

/// Days between scheduling and the technical assessment itself.
const ASSESSMENT_LEAD_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ScheduleTechnicalAssessment,
    RouteToDepartment,
    RequestAdditionalInfo,
    RejectApplication,
    FlagForManualReview,
    SendEmail,
    Done,
}

pub struct ToolSpec {
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [(&'static str, &'static str)],
}

const CANDIDATE_ID: (&str, &str) = ("candidate_id", "string - The candidate's ID");

pub const TOOL_REGISTRY: &[ToolSpec] = &[
    ToolSpec {
        kind: ToolKind::ScheduleTechnicalAssessment,
        name: "schedule_technical_assessment",
        description: "Schedule a technical assessment (coding challenge, system design, etc.) for a promising candidate",
        parameters: &[
            CANDIDATE_ID,
            (
                "assessment_type",
                "string - Type of assessment: 'coding_challenge', 'system_design', 'live_coding'",
            ),
        ],
    },
    ToolSpec {
        kind: ToolKind::RouteToDepartment,
        name: "route_to_department",
        description: "Route candidate to a specific department or hiring manager for further review",
        parameters: &[
            CANDIDATE_ID,
            (
                "department",
                "string - Department name: 'senior_engineering', 'junior_engineering', 'internship'",
            ),
            ("reason", "string - Reason for routing to this department"),
        ],
    },
    ToolSpec {
        kind: ToolKind::RequestAdditionalInfo,
        name: "request_additional_info",
        description: "Request additional information from the candidate (e.g., missing education details, clarification)",
        parameters: &[
            CANDIDATE_ID,
            ("info_needed", "string - Description of what information is needed"),
        ],
    },
    ToolSpec {
        kind: ToolKind::RejectApplication,
        name: "reject_application",
        description: "Reject the candidate's application with a reason",
        parameters: &[
            CANDIDATE_ID,
            (
                "reason",
                "string - Reason for rejection (be professional and constructive)",
            ),
        ],
    },
    ToolSpec {
        kind: ToolKind::FlagForManualReview,
        name: "flag_for_manual_review",
        description: "Flag candidate for manual human review when uncertain or edge case",
        parameters: &[
            CANDIDATE_ID,
            ("concern", "string - Description of what requires human judgment"),
        ],
    },
    ToolSpec {
        kind: ToolKind::SendEmail,
        name: "send_email",
        description: "Send an email to the candidate using a template",
        parameters: &[
            CANDIDATE_ID,
            (
                "template",
                "string - Template name: 'technical_interview_invite', 'rejection', 'request_info'",
            ),
        ],
    },
    ToolSpec {
        kind: ToolKind::Done,
        name: "done",
        description: "Signal that processing is complete for this candidate. Call this when no further automated actions are needed.",
        parameters: &[CANDIDATE_ID],
    },
];

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        TOOL_REGISTRY
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.kind)
    }

    /// 在 `TOOL_REGISTRY` 中的位置
    fn registry_index(&self) -> usize {
        match self {
            ToolKind::ScheduleTechnicalAssessment => 0,
            ToolKind::RouteToDepartment => 1,
            ToolKind::RequestAdditionalInfo => 2,
            ToolKind::RejectApplication => 3,
            ToolKind::FlagForManualReview => 4,
            ToolKind::SendEmail => 5,
            ToolKind::Done => 6,
        }
    }

    pub fn spec(&self) -> &'static ToolSpec {
        &TOOL_REGISTRY[self.registry_index()]
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }
}

/// 產生提示詞中的工具清單
pub fn describe_tools() -> String {
    TOOL_REGISTRY
        .iter()
        .map(|spec| {
            let params: String = spec
                .parameters
                .iter()
                .map(|(name, desc)| format!("\n    - {}: {}", name, desc))
                .collect();
            format!("- {}: {}{}", spec.name, spec.description, params)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct ToolContext {
    pub today: NaiveDate,
}

impl ToolContext {
    pub fn today() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }

    pub fn fixed(today: NaiveDate) -> Self {
        Self { today }
    }

    fn date(&self, offset_days: i64) -> String {
        (self.today + Duration::days(offset_days))
            .format("%Y-%m-%d")
            .to_string()
    }
}

fn argument(kind: ToolKind, args: &Map<String, Value>, key: &str) -> Result<String> {
    let value = match args.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    if value.is_empty() {
        return Err(ScreenerError::ToolError {
            tool: kind.name().to_string(),
            message: format!("missing required argument '{}'", key),
        });
    }
    Ok(value)
}

fn outcome(message: String, details: Value) -> ToolOutcome {
    ToolOutcome {
        status: "success".to_string(),
        message,
        details: match details {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

/// 執行模擬工具，不會對外發送任何東西
pub fn invoke(kind: ToolKind, args: &Map<String, Value>, ctx: &ToolContext) -> Result<ToolOutcome> {
    let candidate_id = argument(kind, args, "candidate_id")?;
    let arg = |key: &str| argument(kind, args, key);

    let result = match kind {
        ToolKind::ScheduleTechnicalAssessment => {
            let assessment_type = arg("assessment_type")?;
            outcome(
                format!(
                    "Technical assessment ({}) scheduled for candidate {}",
                    assessment_type, candidate_id
                ),
                json!({
                    "assessment_type": assessment_type,
                    "scheduled_date": ctx.date(ASSESSMENT_LEAD_DAYS),
                }),
            )
        }
        ToolKind::RouteToDepartment => {
            let department = arg("department")?;
            let reason = arg("reason")?;
            outcome(
                format!("Candidate {} routed to {}", candidate_id, department),
                json!({"department": department, "reason": reason}),
            )
        }
        ToolKind::RequestAdditionalInfo => {
            let info_needed = arg("info_needed")?;
            outcome(
                format!("Additional info requested from candidate {}", candidate_id),
                json!({"info_needed": info_needed, "request_sent_date": ctx.date(0)}),
            )
        }
        ToolKind::RejectApplication => {
            let reason = arg("reason")?;
            outcome(
                format!("Application rejected for candidate {}", candidate_id),
                json!({"reason": reason, "rejection_email_sent": true}),
            )
        }
        ToolKind::FlagForManualReview => {
            let concern = arg("concern")?;
            outcome(
                format!("Candidate {} flagged for manual review", candidate_id),
                json!({"concern": concern, "assigned_to": "hiring_manager"}),
            )
        }
        ToolKind::SendEmail => {
            let template = arg("template")?;
            outcome(
                format!("Email sent to candidate {}", candidate_id),
                json!({"template": template, "sent_date": ctx.date(0)}),
            )
        }
        ToolKind::Done => outcome(
            format!("Processing complete for candidate {}", candidate_id),
            json!({"final": true}),
        ),
    };

    tracing::debug!("🔧 {} -> {}", kind.name(), result.message);
    Ok(result)
}
