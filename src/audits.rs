use crate::errors::RenderError;
use crate::models::{AuditRecord, AuditStatus};
use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRow {
    /// `"<captain login> - <project name>"`
    pub title: String,
    pub status: AuditStatus,
    pub badge: &'static str,
    pub audited_on: Option<String>,
}

/// Decodes the raw audit list, skipping entries that lack the nested fields.
pub fn records_from_values(values: &[Value]) -> Vec<AuditRecord> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            match serde_json::from_value::<AuditRecord>(value.clone()) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("{}", RenderError::new(index, err.to_string()));
                    None
                }
            }
        })
        .collect()
}

pub fn status(record: &AuditRecord) -> AuditStatus {
    let audited = record
        .audited_at
        .as_deref()
        .is_some_and(|at| !at.is_empty());
    let code = record.private.as_ref().and_then(|p| p.code.as_ref());

    match (audited, code) {
        (true, Some(code)) if is_truthy(code) => AuditStatus::Pass,
        (true, Some(_)) => AuditStatus::Fail,
        _ => AuditStatus::Pending,
    }
}

/// Last segment of an object path, e.g. `/bahrain/bh-module/graphql` → `graphql`.
pub fn project_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn row(record: &AuditRecord) -> AuditRow {
    let status = status(record);
    AuditRow {
        title: format!(
            "{} - {}",
            record.group.captain.login,
            project_name(&record.group.path)
        ),
        status,
        badge: status.label(),
        audited_on: record
            .audited_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
            .map(|at| at.date_naive().format("%Y-%m-%d").to_string()),
    }
}

/// Rows in input order.
pub fn rows(records: &[AuditRecord]) -> Vec<AuditRow> {
    records.iter().map(row).collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
