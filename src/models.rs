use serde::{Deserialize, Serialize};
use serde_json::Value;

// Wire shapes of the profile query. Everything the page can live without is
// optional so that a partial response still decodes.

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default)]
    pub user: Vec<RawUser>,
    #[serde(default, rename = "transaction_aggregate")]
    pub transaction_aggregate: Option<RawAggregate>,
    #[serde(default)]
    pub progression_skill: Vec<RawSkillHolder>,
    #[serde(default)]
    pub recent_proj: Vec<RawRecentProject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub total_up: Option<f64>,
    #[serde(default)]
    pub total_down: Option<f64>,
    #[serde(default)]
    pub attrs: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawAggregate {
    pub aggregate: Option<RawAggregateSum>,
}

#[derive(Debug, Deserialize)]
pub struct RawAggregateSum {
    pub sum: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
pub struct RawAmount {
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawSkillHolder {
    #[serde(default)]
    pub transactions: Value,
}

#[derive(Debug, Deserialize)]
pub struct RawRecentProject {
    pub object: Option<RawObject>,
}

#[derive(Debug, Deserialize)]
pub struct RawObject {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuditData {
    pub audit: Option<Vec<Value>>,
}

// Normalized view-models.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserIdentity {
    pub id: i64,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub identity: UserIdentity,
    /// Raw XP sum; `None` when the aggregate came back null.
    pub total_xp: Option<f64>,
    pub total_up: f64,
    pub total_down: f64,
    /// Most recent first, at most five.
    pub recent_projects: Vec<String>,
}

/// One `skill_<name>` transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillRecord {
    pub tag: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSkill {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    #[serde(default)]
    pub audited_at: Option<String>,
    pub group: AuditGroup,
    #[serde(default)]
    pub private: Option<AuditPrivate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuditGroup {
    pub path: String,
    pub captain: Captain,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Captain {
    pub login: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuditPrivate {
    #[serde(default)]
    pub code: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Pending,
    Pass,
    Fail,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Pending => "pending",
            AuditStatus::Pass => "pass",
            AuditStatus::Fail => "fail",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuditStatus::Pending => "Pending",
            AuditStatus::Pass => "Pass",
            AuditStatus::Fail => "Fail",
        }
    }
}

/// Everything one profile load brings back, already normalized.
#[derive(Debug, Clone)]
pub struct FetchedProfile {
    pub summary: ProfileSummary,
    pub skills: Vec<SkillRecord>,
    /// `None` when the audit response could not be decoded.
    pub audits: Option<Vec<AuditRecord>>,
}
