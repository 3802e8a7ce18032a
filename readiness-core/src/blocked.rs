//! Blocked-ticket triage: blocker reasons, linked blockers and the report.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{IssueLink, Ticket};
use crate::grooming::format_age;

/// Reason shown when nothing in the ticket explains the block.
pub const NO_REASON: &str = "No explicit blocker reason documented";
/// Tickets older than this many days count as ancient.
pub const ANCIENT_DAYS: i64 = 180;
/// Tickets older than this many days count as old.
pub const OLD_DAYS: i64 = 90;
/// Tickets younger than this many days count as recent.
pub const RECENT_DAYS: i64 = 30;

const MATCHES_PER_PATTERN: usize = 2;
const MAX_REASONS: usize = 3;
const MIN_REASON_CHARS: usize = 10;
const SUMMARY_WIDTH: usize = 70;
const REASON_WIDTH: usize = 100;
const ACTION_LIST_LIMIT: usize = 5;
const RULE_WIDTH: usize = 100;
const DONE_STATUSES: &[&str] = &["done", "closed"];

static BLOCKER_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(?:blocked by|waiting (?:on|for)|depends on|needs)\s+([^\n.]+)")
            .expect("dependency blocker pattern"),
        Regex::new(r"(?i)(?:blocker|blocking issue):\s*([^\n.]+)")
            .expect("labelled blocker pattern"),
        Regex::new(r"(?i)(?:cannot proceed|can't start) (?:until|because)\s+([^\n.]+)")
            .expect("cannot proceed pattern"),
    ]
});

/// Search for blocked tickets, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedQuery {
    /// Project key.
    pub project: String,
    /// Only tickets created at least this many days ago; 0 disables the filter.
    pub min_age_days: u32,
}

impl BlockedQuery {
    /// Build the JQL for this query.
    pub fn to_jql(&self) -> String {
        let mut jql = format!("project = {} AND status = Blocked", self.project);
        if self.min_age_days > 0 {
            let _ = write!(jql, " AND created <= -{}d", self.min_age_days);
        }
        jql.push_str(" ORDER BY created ASC");
        jql
    }
}

/// A comment body with its age in days, when the timestamp parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatedComment {
    /// Plain-text body.
    pub body: String,
    /// Days since the comment was posted.
    pub age_days: Option<i64>,
}

/// Explicit blocker reasons quoted from the description and comments.
///
/// Each pattern contributes at most two matches; reasons of ten characters
/// or fewer are dropped, duplicates are removed case-insensitively and at
/// most three are kept.
pub fn blocker_reasons(ticket: &Ticket) -> Vec<String> {
    let mut text = format!("{}\n", ticket.description);
    text.push_str(&ticket.comments.join("\n"));

    let mut seen = BTreeSet::new();
    let mut reasons = Vec::new();
    for pattern in BLOCKER_PATTERNS.iter() {
        for captures in pattern.captures_iter(&text).take(MATCHES_PER_PATTERN) {
            let Some(reason) = captures.get(1).map(|m| m.as_str().trim()) else {
                continue;
            };
            if reason.chars().count() > MIN_REASON_CHARS && seen.insert(reason.to_lowercase()) {
                reasons.push(reason.to_string());
            }
        }
    }
    reasons.truncate(MAX_REASONS);
    reasons
}

/// Blocker reasons joined with `; `, or [`NO_REASON`].
pub fn blocker_reason(ticket: &Ticket) -> String {
    let reasons = blocker_reasons(ticket);
    if reasons.is_empty() {
        NO_REASON.to_string()
    } else {
        reasons.join("; ")
    }
}

/// Links to issues that block this ticket.
pub fn linked_blockers(ticket: &Ticket) -> Vec<IssueLink> {
    ticket
        .links
        .iter()
        .filter(|link| link.relationship.to_lowercase().contains("blocked by"))
        .cloned()
        .collect()
}

/// Days since the block started, judged by the latest comment that mentions
/// blocking.
pub fn blocked_since(comments: &[DatedComment]) -> Option<i64> {
    comments
        .iter()
        .rev()
        .filter(|comment| {
            let body = comment.body.to_lowercase();
            body.contains("blocked") || body.contains("blocking")
        })
        .find_map(|comment| comment.age_days.filter(|days| *days > 0))
}

/// One blocked ticket with everything needed to triage it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTicket {
    /// Tracker key.
    pub key: String,
    /// Ticket summary.
    pub summary: String,
    /// Workflow status.
    pub status: String,
    /// Priority name.
    pub priority: String,
    /// Days since creation.
    pub age_days: Option<i64>,
    /// Estimated days since the block started.
    pub blocked_since_days: Option<i64>,
    /// Explicit blocker reasons or [`NO_REASON`].
    pub blocker_reason: String,
    /// Issues blocking this one.
    pub linked_blockers: Vec<IssueLink>,
    /// Whether the ticket carries an estimate.
    pub estimated: bool,
    /// Readiness total, when analysis was requested.
    pub readiness_score: Option<u32>,
}

impl BlockedTicket {
    /// Triage a ticket snapshot.
    pub fn new(
        ticket: &Ticket,
        priority: impl Into<String>,
        age_days: Option<i64>,
        comments: &[DatedComment],
    ) -> Self {
        Self {
            key: ticket.key.clone(),
            summary: ticket.summary.clone(),
            status: ticket.status.clone(),
            priority: priority.into(),
            age_days,
            blocked_since_days: blocked_since(comments),
            blocker_reason: blocker_reason(ticket),
            linked_blockers: linked_blockers(ticket),
            estimated: ticket.is_estimated(),
            readiness_score: None,
        }
    }

    fn age(&self) -> i64 {
        self.age_days.unwrap_or_default()
    }

    fn is_ancient(&self) -> bool {
        self.age() > ANCIENT_DAYS
    }

    fn reason_documented(&self) -> bool {
        self.blocker_reason != NO_REASON
    }

    /// Whether any linked blocker is already done or closed.
    pub fn has_finished_blocker(&self) -> bool {
        self.linked_blockers.iter().any(|link| {
            DONE_STATUSES
                .iter()
                .any(|status| link.status.eq_ignore_ascii_case(status))
        })
    }

    fn blocker_list(&self) -> String {
        self.linked_blockers
            .iter()
            .map(|link| {
                let status = if link.status.is_empty() {
                    "Unknown"
                } else {
                    link.status.as_str()
                };
                format!("{} ({status})", link.key)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn recommendation(&self) -> Option<&'static str> {
        if self.is_ancient() {
            Some("Consider closing if still blocked after 6+ months")
        } else if self.linked_blockers.is_empty() && !self.reason_documented() {
            Some("Document the specific blocker or unblock if resolved")
        } else if self.has_finished_blocker() {
            Some("Linked blocker(s) are done; unblock this ticket")
        } else {
            None
        }
    }
}

fn truncated(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Render the blocked-ticket report: statistics, age buckets, one entry per
/// ticket (oldest first) and follow-up actions.
pub fn render_blocked(tickets: &[BlockedTicket]) -> String {
    let mut output = String::new();
    if tickets.is_empty() {
        let _ = writeln!(output, "No blocked tickets found.");
        return output;
    }
    let rule = "=".repeat(RULE_WIDTH);
    let count = tickets.len();
    let _ = writeln!(output, "{rule}");
    let _ = writeln!(output, "Blocked Tickets Report: {count} blocked ticket(s)");
    let _ = writeln!(output, "{rule}\n");

    append_statistics(&mut output, tickets);
    append_age_buckets(&mut output, tickets);

    let mut sorted: Vec<&BlockedTicket> = tickets.iter().collect();
    sorted.sort_by_key(|ticket| std::cmp::Reverse(ticket.age()));
    let _ = writeln!(output, "Blocked tickets (oldest first):\n");
    for (index, ticket) in sorted.iter().enumerate() {
        append_ticket(&mut output, index + 1, ticket);
    }

    let _ = writeln!(output, "{rule}");
    append_actions(&mut output, tickets);
    let _ = writeln!(output, "{rule}");
    output
}

fn append_statistics(output: &mut String, tickets: &[BlockedTicket]) {
    let count = tickets.len();
    let total_age: i64 = tickets.iter().map(BlockedTicket::age).sum();
    let average = total_age / count as i64;
    let estimated = tickets.iter().filter(|t| t.estimated).count();
    let linked = tickets.iter().filter(|t| !t.linked_blockers.is_empty()).count();
    let ancient = tickets.iter().filter(|t| t.is_ancient()).count();

    let _ = writeln!(output, "Summary:");
    let _ = writeln!(output, "  Total blocked: {count}");
    let _ = writeln!(output, "  Average age: {}", format_age(Some(average)));
    let _ = writeln!(output, "  Estimated: {estimated}/{count}");
    let _ = writeln!(output, "  With linked blockers: {linked}/{count}");
    let _ = writeln!(output, "  Ancient (>6 months): {ancient}\n");
}

fn append_age_buckets(output: &mut String, tickets: &[BlockedTicket]) {
    let in_range = |low: i64, high: i64| {
        tickets
            .iter()
            .filter(|t| (low..high).contains(&t.age()))
            .count()
    };
    let buckets = [
        ("Recent (< 1 month)", in_range(i64::MIN, RECENT_DAYS)),
        ("Moderate (1-3 months)", in_range(RECENT_DAYS, OLD_DAYS)),
        ("Old (3-6 months)", in_range(OLD_DAYS, ANCIENT_DAYS)),
        ("Ancient (> 6 months)", in_range(ANCIENT_DAYS, i64::MAX)),
    ];
    let _ = writeln!(output, "Age distribution:");
    for (label, count) in buckets.iter().filter(|(_, count)| *count > 0) {
        let _ = writeln!(output, "  {label}: {count}");
    }
    let _ = writeln!(output);
}

fn append_ticket(output: &mut String, position: usize, ticket: &BlockedTicket) {
    let _ = writeln!(
        output,
        "{position}. {} - {}",
        ticket.key,
        truncated(&ticket.summary, SUMMARY_WIDTH)
    );
    let _ = writeln!(
        output,
        "   Priority: {} | Age: {} | Estimated: {}",
        ticket.priority,
        format_age(ticket.age_days),
        if ticket.estimated { "yes" } else { "no" }
    );
    if let Some(days) = ticket.blocked_since_days {
        let _ = writeln!(output, "   Blocked for: ~{}", format_age(Some(days)));
    }
    let _ = writeln!(
        output,
        "   Blocker: {}",
        truncated(&ticket.blocker_reason, REASON_WIDTH)
    );
    if ticket.linked_blockers.is_empty() {
        let _ = writeln!(output, "   No linked blocker tickets");
    } else {
        let _ = writeln!(output, "   Blocking tickets: {}", ticket.blocker_list());
    }
    if let Some(score) = ticket.readiness_score {
        let _ = writeln!(output, "   Readiness: {score}/100");
    }
    if let Some(recommendation) = ticket.recommendation() {
        let _ = writeln!(output, "   Recommendation: {recommendation}");
    }
    let _ = writeln!(output);
}

fn append_actions(output: &mut String, tickets: &[BlockedTicket]) {
    let _ = writeln!(output, "Recommended actions:\n");
    let mut step = 0;
    let mut heading = |output: &mut String, text: String| {
        step += 1;
        let _ = writeln!(output, "{step}. {text}");
    };

    let ancient: Vec<_> = tickets.iter().filter(|t| t.is_ancient()).collect();
    if !ancient.is_empty() {
        heading(
            output,
            format!("Review {} ancient ticket(s) (>6 months blocked):", ancient.len()),
        );
        for ticket in ancient.iter().take(ACTION_LIST_LIMIT) {
            let _ = writeln!(output, "   - {} - {} old", ticket.key, format_age(ticket.age_days));
        }
        if ancient.len() > ACTION_LIST_LIMIT {
            let _ = writeln!(output, "   - ... and {} more", ancient.len() - ACTION_LIST_LIMIT);
        }
        let _ = writeln!(output);
    }

    let undocumented: Vec<_> = tickets.iter().filter(|t| !t.reason_documented()).collect();
    if !undocumented.is_empty() {
        heading(
            output,
            format!(
                "Document blockers for {} ticket(s) with unclear reasons:",
                undocumented.len()
            ),
        );
        for ticket in undocumented.iter().take(ACTION_LIST_LIMIT) {
            let _ = writeln!(output, "   - {}", ticket.key);
        }
        let _ = writeln!(output);
    }

    let unblockable: Vec<_> = tickets.iter().filter(|t| t.has_finished_blocker()).collect();
    if !unblockable.is_empty() {
        heading(
            output,
            format!(
                "Unblock {} ticket(s) with completed blockers:",
                unblockable.len()
            ),
        );
        for ticket in &unblockable {
            let _ = writeln!(output, "   - {} - blockers: {}", ticket.key, ticket.blocker_list());
        }
        let _ = writeln!(output);
    }

    let unestimated: Vec<_> = tickets
        .iter()
        .filter(|t| !t.estimated && t.age() < OLD_DAYS)
        .collect();
    if !unestimated.is_empty() {
        heading(
            output,
            format!(
                "Estimate {} unestimated blocked ticket(s) once unblocked:",
                unestimated.len()
            ),
        );
        for ticket in unestimated.iter().take(ACTION_LIST_LIMIT) {
            let _ = writeln!(output, "   - {}", ticket.key);
        }
        let _ = writeln!(output);
    }
}
