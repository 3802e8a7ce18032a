//! Report types and rendering for readiness analyses.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Gap, Severity};
use crate::profiles::ScoringProfile;
use crate::scoring::CategoryScore;

const RULE_WIDTH: usize = 80;
const RECOMMENDED_HIGH_GAPS: usize = 3;

/// Outcome of analyzing one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessReport {
    /// Tracker key.
    pub issue_key: String,
    /// Ticket summary.
    pub summary: String,
    /// Issue type as reported by the tracker.
    pub issue_type: String,
    /// Workflow status.
    pub status: String,
    /// Name of the profile used.
    pub profile: String,
    /// Per-category scores in the profile's display order.
    pub category_scores: Vec<CategoryScore>,
    /// Sum of the category scores.
    pub total_score: u32,
    /// Gaps in detector order.
    pub gaps: Vec<Gap>,
    /// Strength labels in check order.
    pub strengths: Vec<String>,
    /// Readiness verdict.
    pub ready_for_estimation: bool,
    /// Whether the ticket already carries an estimate.
    pub estimated: bool,
}

impl ReadinessReport {
    /// Score of one category, if the profile scores it.
    pub fn score(&self, category: Category) -> Option<u32> {
        self.category_scores
            .iter()
            .find(|score| score.category == category)
            .map(|score| score.score)
    }

    /// Gaps of one severity, in detector order.
    pub fn gaps_with(&self, severity: Severity) -> impl Iterator<Item = &Gap> {
        self.gaps.iter().filter(move |gap| gap.severity == severity)
    }
}

/// Headline label for a total score and verdict.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadinessTier {
    /// Ready and at or above the excellent score.
    Excellent,
    /// Ready and at or above the ready threshold.
    Ready,
    /// Total clears the threshold but the requirements floor does not.
    MostlyReady,
    /// At or above the low-water score.
    NeedsWork,
    /// Below the low-water score.
    NotReady,
}

impl ReadinessTier {
    /// Classify a total score and verdict against a profile's tiers.
    pub fn classify(total: u32, ready: bool, profile: &ScoringProfile) -> Self {
        if total >= profile.ready_threshold && !ready {
            ReadinessTier::MostlyReady
        } else if total >= profile.excellent_score {
            ReadinessTier::Excellent
        } else if total >= profile.ready_threshold {
            ReadinessTier::Ready
        } else if total >= profile.low_water_score {
            ReadinessTier::NeedsWork
        } else {
            ReadinessTier::NotReady
        }
    }

    /// Uppercase label.
    pub fn label(&self) -> &'static str {
        match self {
            ReadinessTier::Excellent => "EXCELLENT",
            ReadinessTier::Ready => "READY",
            ReadinessTier::MostlyReady => "MOSTLY READY",
            ReadinessTier::NeedsWork => "NEEDS WORK",
            ReadinessTier::NotReady => "NOT READY",
        }
    }

    fn detail(&self) -> &'static str {
        match self {
            ReadinessTier::Excellent => "Excellent readiness",
            ReadinessTier::Ready => "Minor clarifications needed",
            ReadinessTier::MostlyReady => "Requirements need clarification first",
            ReadinessTier::NeedsWork => "Some gaps to address",
            ReadinessTier::NotReady => "Significant work needed",
        }
    }
}

/// Render one report as human-readable text.
pub fn render_text(report: &ReadinessReport, profile: &ScoringProfile, verbose: bool) -> String {
    let mut output = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(output, "{rule}");
    let _ = writeln!(output, "Readiness Analysis: {}", report.issue_key);
    let _ = writeln!(output, "{rule}");
    let _ = writeln!(output, "Summary: {}", report.summary);
    let _ = writeln!(
        output,
        "Type: {} | Status: {} | Profile: {}",
        report.issue_type, report.status, report.profile
    );
    if report.estimated {
        let _ = writeln!(output, "Already estimated.");
    }
    let _ = writeln!(output);

    append_scores(&mut output, report);
    let tier = ReadinessTier::classify(report.total_score, report.ready_for_estimation, profile);
    let _ = writeln!(output, "{} - {}\n", tier.label(), tier.detail());

    if !report.strengths.is_empty() {
        let _ = writeln!(output, "Strengths:");
        for strength in &report.strengths {
            let _ = writeln!(output, "  - {strength}");
        }
        let _ = writeln!(output);
    }
    append_gaps(&mut output, &report.gaps, verbose);
    append_recommendation(&mut output, report);
    let _ = writeln!(output, "{rule}");
    output
}

/// Render several reports followed by a one-line tally.
pub fn render_text_batch(
    reports: &[ReadinessReport],
    profile: &ScoringProfile,
    verbose: bool,
) -> String {
    let mut output = String::new();
    for report in reports {
        output.push_str(&render_text(report, profile, verbose));
        let _ = writeln!(output);
    }
    if reports.len() > 1 {
        let ready = reports
            .iter()
            .filter(|report| report.ready_for_estimation)
            .count();
        let _ = writeln!(output, "{ready}/{} ticket(s) ready for estimation", reports.len());
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

fn append_scores(output: &mut String, report: &ReadinessReport) {
    let _ = writeln!(output, "Readiness Score: {}/100", report.total_score);
    for score in &report.category_scores {
        let label = format!("{}:", score.category.title());
        let _ = writeln!(output, "  {label:<14}{}/{}", score.score, score.max);
    }
    let _ = writeln!(output);
}

fn append_gaps(output: &mut String, gaps: &[Gap], verbose: bool) {
    if gaps.is_empty() {
        let _ = writeln!(output, "No gaps detected.\n");
        return;
    }
    let _ = writeln!(output, "Gaps Found ({}):\n", gaps.len());
    for (index, gap) in gaps.iter().enumerate() {
        let _ = writeln!(output, "{}. {} [{}]", index + 1, gap.title, gap.severity);
        let _ = writeln!(output, "   {}", gap.description);
        if verbose {
            append_bullets(output, "Questions", &gap.questions);
            append_bullets(output, "Actions", &gap.actions);
        }
        let _ = writeln!(output);
    }
}

fn append_bullets(output: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(output, "   {title}:");
    for item in items {
        let _ = writeln!(output, "     - {item}");
    }
}

fn append_recommendation(output: &mut String, report: &ReadinessReport) {
    let _ = writeln!(output, "Recommendation:");
    if report.ready_for_estimation {
        let _ = writeln!(
            output,
            "  Ready for estimation. Minor gaps can be addressed during planning."
        );
        return;
    }
    let mut high = report.gaps_with(Severity::High).peekable();
    if high.peek().is_none() {
        let _ = writeln!(output, "  Work through the gaps above before estimating.");
        return;
    }
    let _ = writeln!(output, "  Address HIGH severity gaps before estimating:");
    for gap in high.take(RECOMMENDED_HIGH_GAPS) {
        let _ = writeln!(output, "  - {}", gap.title);
        if let Some(action) = gap.actions.first() {
            let _ = writeln!(output, "    -> {action}");
        }
    }
}
