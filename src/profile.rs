use crate::audits::{self, AuditRow};
use crate::config::{RatioCopy, RATIO_THRESHOLD};
use crate::fixed::to_fixed;
use crate::models::{AggregatedSkill, FetchedProfile, UserIdentity};
use crate::radar::{self, RadarLayout};
use crate::ratio::{self, RatioLayout};
use crate::skills;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Avatar {
    Female,
    Male,
}

impl Avatar {
    pub fn glyph(&self) -> &'static str {
        match self {
            Avatar::Female => "👩",
            Avatar::Male => "👦",
        }
    }
}

/// Everything the dashboard page shows, computed for one chart width.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub identity: UserIdentity,
    pub welcome: String,
    pub avatar: Avatar,
    pub xp_total: String,
    pub audit_ratio: String,
    pub recent_projects: Vec<String>,
    pub skills: Vec<AggregatedSkill>,
    pub radar: RadarLayout,
    pub ratio: RatioLayout,
    /// `None` when the audit section could not be loaded.
    pub audits: Option<Vec<AuditRow>>,
    pub chart_width: u32,
}

pub fn build_view(profile: &FetchedProfile, chart_width: u32, copy: &RatioCopy) -> ProfileView {
    let summary = &profile.summary;
    let identity = &summary.identity;
    let width = f64::from(chart_width);

    let top_skills = skills::aggregate(&profile.skills);
    let series = skills::radar_series(&top_skills);

    let done = summary.total_up / 1000.0;
    let received = summary.total_down / 1000.0;

    ProfileView {
        welcome: format!(
            "Welcome, {} {} ({})!",
            identity.first_name, identity.last_name, identity.login
        ),
        avatar: match identity.gender.as_deref() {
            Some("Female") => Avatar::Female,
            _ => Avatar::Male,
        },
        xp_total: format_xp(summary.total_xp),
        audit_ratio: ratio_text(done, received, copy),
        recent_projects: summary.recent_projects.clone(),
        skills: top_skills,
        radar: radar::layout(width, &series),
        ratio: ratio::layout(width, done, received),
        audits: profile.audits.as_deref().map(audits::rows),
        identity: identity.clone(),
        chart_width,
    }
}

/// Raw XP sum in KB, or MB with one decimal from 1000 KB up.
pub fn format_xp(total: Option<f64>) -> String {
    let Some(total) = total else {
        return "0 KB".to_string();
    };
    let kb = total / 1000.0;
    if kb >= 1000.0 {
        format!("{} MB", to_fixed(kb / 1000.0, 1))
    } else {
        format!("{} KB", to_fixed(kb, 0))
    }
}

/// Done/received ratio to one decimal plus the matching message. The
/// threshold is checked against the displayed value.
pub fn ratio_text(done: f64, received: f64, copy: &RatioCopy) -> String {
    if received <= 0.0 {
        return format!("N/A - {}", copy.good);
    }
    let ratio = done / received;
    let shown = to_fixed(ratio, 1);
    let rounded = shown.parse::<f64>().unwrap_or(ratio);
    let message = if rounded < RATIO_THRESHOLD {
        &copy.low
    } else {
        &copy.good
    };
    format!("{shown} - {message}")
}
