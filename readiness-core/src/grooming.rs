//! Grooming-candidate search: JQL construction and listing.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Project whose grooming board filter is the default.
pub const BOARD_PROJECT: &str = "FSEC";
/// Summaries in the candidate listing are cut to this many characters.
pub const SUMMARY_WIDTH: usize = 60;

const BOARD_TYPES: &str = "type in (Spike, Story, Task)";
const BOARD_STATUSES: &str = "status in (Backlog, \"In Progress\", Blocked, Intake, \
     \"Ready to Refine\", \"Ready to Ship\", Refined, \"To Do\", Shipping, Testing, Review)";
const BOARD_ORDER: &str = "ORDER BY updated DESC";
const DEFAULT_STATUSES: &str = "status IN (\"Needs More Info\", \"Backlog\", \"To Do\")";
const DEFAULT_TYPES: &str = "type NOT IN (Epic, Sub-task)";
const CUSTOM_ORDER: &str = "ORDER BY priority DESC, created ASC";
const UNESTIMATED: &str = "(\"Story Points\" IS EMPTY OR \"Story Points\" = 0)";

/// Search criteria for tickets that need grooming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroomingQuery {
    /// Project key.
    pub project: Option<String>,
    /// Exact status; disables the board filter.
    pub status: Option<String>,
    /// Required label.
    pub label: Option<String>,
    /// Only tickets without story points.
    pub unestimated: bool,
    /// Exact issue type; disables the board filter.
    pub issue_type: Option<String>,
    /// Raw JQL that overrides every other criterion.
    pub jql: Option<String>,
    /// Allow the board filter when the other criteria permit it.
    pub board_filter: bool,
}

impl GroomingQuery {
    /// Whether the board filter applies: requested, board project, and
    /// neither status nor type narrowed.
    pub fn uses_board_filter(&self) -> bool {
        self.board_filter
            && self
                .project
                .as_deref()
                .is_none_or(|project| project.eq_ignore_ascii_case(BOARD_PROJECT))
            && self.status.is_none()
            && self.issue_type.is_none()
    }

    /// Build the JQL for this query.
    pub fn to_jql(&self) -> String {
        if let Some(jql) = &self.jql {
            return jql.clone();
        }
        if self.uses_board_filter() {
            return self.board_jql();
        }
        self.custom_jql()
    }

    fn extra_conditions(&self) -> Vec<String> {
        let mut conditions = Vec::new();
        if let Some(label) = &self.label {
            conditions.push(format!("labels = {label}"));
        }
        if self.unestimated {
            conditions.push(UNESTIMATED.to_string());
        }
        conditions
    }

    fn board_jql(&self) -> String {
        let project = self.project.as_deref().unwrap_or(BOARD_PROJECT);
        let mut conditions = vec![
            format!("project = {project}"),
            BOARD_TYPES.to_string(),
            BOARD_STATUSES.to_string(),
        ];
        conditions.extend(self.extra_conditions());
        format!("{} {BOARD_ORDER}", conditions.join(" AND "))
    }

    fn custom_jql(&self) -> String {
        let mut conditions = Vec::new();
        if let Some(project) = &self.project {
            conditions.push(format!("project = {project}"));
        }
        match &self.status {
            Some(status) => conditions.push(format!("status = \"{status}\"")),
            None => conditions.push(DEFAULT_STATUSES.to_string()),
        }
        conditions.extend(self.extra_conditions());
        match &self.issue_type {
            Some(issue_type) => conditions.push(format!("type = \"{issue_type}\"")),
            None => conditions.push(DEFAULT_TYPES.to_string()),
        }
        format!("{} {CUSTOM_ORDER}", conditions.join(" AND "))
    }
}

/// One search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Tracker key.
    pub key: String,
    /// Ticket summary.
    pub summary: String,
    /// Workflow status.
    pub status: String,
    /// Priority name.
    pub priority: String,
    /// Days since creation, when the creation date parsed.
    pub age_days: Option<i64>,
}

/// Human-readable age: "Today", "N days", "N weeks", "N months", "N years".
pub fn format_age(age_days: Option<i64>) -> String {
    let Some(days) = age_days.filter(|days| *days >= 0) else {
        return "Unknown".to_string();
    };
    match days {
        0 => "Today".to_string(),
        1..=6 => plural(days, "day"),
        7..=29 => plural(days / 7, "week"),
        30..=364 => plural(days / 30, "month"),
        _ => plural(days / 365, "year"),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Cut a summary to [`SUMMARY_WIDTH`] characters.
pub fn truncate_summary(summary: &str) -> String {
    summary.chars().take(SUMMARY_WIDTH).collect()
}

/// Render the candidate table.
pub fn render_candidates(candidates: &[Candidate]) -> String {
    let mut output = String::new();
    if candidates.is_empty() {
        let _ = writeln!(output, "No tickets found matching criteria.");
        return output;
    }
    let _ = writeln!(
        output,
        "Found {} ticket(s) needing grooming:\n",
        candidates.len()
    );
    let _ = writeln!(
        output,
        "{:<15} {:<12} {:<10} {:<20} Summary",
        "Key", "Age", "Priority", "Status"
    );
    let _ = writeln!(output, "{}", "-".repeat(120));
    for candidate in candidates {
        let _ = writeln!(
            output,
            "{:<15} {:<12} {:<10} {:<20} {}",
            candidate.key,
            format_age(candidate.age_days),
            candidate.priority,
            candidate.status,
            truncate_summary(&candidate.summary)
        );
    }
    output
}
