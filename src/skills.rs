use crate::models::{AggregatedSkill, SkillRecord};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const TOP_SKILLS: usize = 6;
/// Raw skill amounts are out of 100; the radar chart is drawn out of 5.
pub const CHART_SCALE: f64 = 5.0;

/// Labels and plot values for the radar chart, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Reads the `transactions` list of the skills query. Anything that is not an
/// array is treated as no skills.
pub fn records_from_value(value: &Value) -> Vec<SkillRecord> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("expected an array of skills, got {}", kind_of(value));
        }
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let tag = item.get("type").and_then(Value::as_str);
            let amount = item.get("amount").and_then(Value::as_f64);
            match (tag, amount) {
                (Some(tag), Some(amount)) if amount.is_finite() => Some(SkillRecord {
                    tag: tag.to_string(),
                    amount,
                }),
                _ => {
                    debug!("skipping skill record {index}: missing type or numeric amount");
                    None
                }
            }
        })
        .collect()
}

/// Sums amounts per display name and keeps the six largest.
pub fn aggregate(records: &[SkillRecord]) -> Vec<AggregatedSkill> {
    let mut totals: Vec<AggregatedSkill> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(raw) = raw_name(&record.tag) else {
            debug!(tag = %record.tag, "skipping non-skill tag");
            continue;
        };
        let name = display_name(raw);
        match positions.get(name).copied() {
            Some(at) => totals[at].amount += record.amount,
            None => {
                positions.insert(name.to_string(), totals.len());
                totals.push(AggregatedSkill {
                    name: name.to_string(),
                    amount: record.amount,
                });
            }
        }
    }

    // sort_by is stable, so equal totals keep encounter order
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals.truncate(TOP_SKILLS);
    totals
}

/// Capitalized labels and 0..5 plot values for the radar chart.
pub fn radar_series(skills: &[AggregatedSkill]) -> RadarSeries {
    let mut series = RadarSeries::default();
    for skill in skills {
        if skill.name.chars().count() < 2 {
            continue;
        }
        series.labels.push(capitalize(&skill.name));
        series.values.push(skill.amount / 100.0 * CHART_SCALE);
    }
    series
}

fn raw_name(tag: &str) -> Option<&str> {
    let mut parts = tag.split('_');
    match (parts.next(), parts.next()) {
        (Some("skill"), Some(name)) if !name.is_empty() => Some(name),
        _ => None,
    }
}

fn display_name(raw: &str) -> &str {
    match raw {
        "front" => "frontend",
        "algo" => "HTML",
        other => other,
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(tag: &str, amount: f64) -> SkillRecord {
        SkillRecord {
            tag: tag.to_string(),
            amount,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn front_records_merge_into_frontend() {
        let records = vec![
            record("skill_front", 40.0),
            record("skill_front", 20.0),
            record("skill_go", 10.0),
        ];
        let skills = aggregate(&records);
        assert_eq!(
            skills,
            vec![
                AggregatedSkill { name: "frontend".into(), amount: 60.0 },
                AggregatedSkill { name: "go".into(), amount: 10.0 },
            ]
        );

        let series = radar_series(&skills);
        assert_eq!(series.labels, vec!["Frontend", "Go"]);
        assert!(close(series.values[0], 3.0));
        assert!(close(series.values[1], 0.5));
    }

    #[test]
    fn algo_is_shown_as_html() {
        let skills = aggregate(&[record("skill_algo", 15.0), record("skill_algo", 5.0)]);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "HTML");
        assert!(close(skills[0].amount, 20.0));
        assert_eq!(radar_series(&skills).labels, vec!["HTML"]);
    }

    #[test]
    fn keeps_top_six_in_descending_order() {
        let records: Vec<SkillRecord> = ["a1", "b2", "c3", "d4", "e5", "f6", "g7", "h8"]
            .iter()
            .enumerate()
            .map(|(i, name)| record(&format!("skill_{name}"), (i as f64 + 1.0) * 10.0))
            .collect();
        let skills = aggregate(&records);
        assert_eq!(skills.len(), TOP_SKILLS);
        assert_eq!(skills[0].name, "h8");
        assert!(skills.windows(2).all(|pair| pair[0].amount >= pair[1].amount));
        assert!(!skills.iter().any(|skill| skill.name == "a1" || skill.name == "b2"));
    }

    #[test]
    fn ties_keep_encounter_order() {
        let skills = aggregate(&[
            record("skill_js", 30.0),
            record("skill_go", 30.0),
            record("skill_sql", 30.0),
        ]);
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["js", "go", "sql"]);
    }

    #[test]
    fn non_conforming_tags_are_skipped() {
        let skills = aggregate(&[
            record("xp", 500.0),
            record("skill_", 10.0),
            record("skillgo", 10.0),
            record("skill_prog", 25.0),
        ]);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "prog");
    }

    #[test]
    fn single_letter_names_are_dropped_from_the_chart() {
        let skills = aggregate(&[record("skill_c", 50.0), record("skill_go", 20.0)]);
        assert_eq!(skills.len(), 2);
        let series = radar_series(&skills);
        assert_eq!(series.labels, vec!["Go"]);
        assert_eq!(series.values.len(), 1);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let skills = aggregate(&[]);
        assert!(skills.is_empty());
        assert_eq!(radar_series(&skills), RadarSeries::default());
    }

    #[test]
    fn records_from_value_filters_bad_entries() {
        let value = json!([
            { "type": "skill_go", "amount": 10 },
            { "type": "skill_js", "amount": "lots" },
            { "amount": 5 },
            "skill_rust",
            { "type": "skill_sql", "amount": 12.5 }
        ]);
        let records = records_from_value(&value);
        assert_eq!(records, vec![record("skill_go", 10.0), record("skill_sql", 12.5)]);
    }

    #[test]
    fn non_array_input_is_empty() {
        assert!(records_from_value(&json!({ "type": "skill_go" })).is_empty());
        assert!(records_from_value(&Value::Null).is_empty());
    }
}
