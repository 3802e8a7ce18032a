//! Domain entities for ticket readiness analysis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReadinessError;

/// A read-only snapshot of a tracker ticket.
///
/// Every field defaults to an empty value so partially populated snapshots
/// deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ticket {
    /// Issue key, e.g. `FSEC-1234`.
    pub key: String,
    /// One-line summary.
    pub summary: String,
    /// Plain-text description.
    pub description: String,
    /// Issue type name, e.g. `Story` or `Bug`.
    pub issue_type: String,
    /// Workflow status name.
    pub status: String,
    /// Comment bodies, oldest first.
    pub comments: Vec<String>,
    /// Linked issues.
    pub links: Vec<IssueLink>,
    /// Numeric estimate, when one is attached.
    pub estimate: Option<f64>,
}

impl Ticket {
    /// Whether a numeric estimate is already attached.
    pub fn is_estimated(&self) -> bool {
        self.estimate.is_some()
    }
}

/// A relationship from one ticket to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueLink {
    /// Relationship label, e.g. `is blocked by`.
    pub relationship: String,
    /// Key of the linked issue.
    pub key: String,
    /// Status of the linked issue.
    pub status: String,
}

/// Scoring dimension a gap belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Problem framing, acceptance criteria and scope.
    Requirements,
    /// Implementation approach, affected systems, dependencies.
    Technical,
    /// Verification approach.
    Testing,
    /// Security and surrounding context.
    Context,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 4] = [
        Category::Requirements,
        Category::Technical,
        Category::Testing,
        Category::Context,
    ];

    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Requirements => "requirements",
            Category::Technical => "technical",
            Category::Testing => "testing",
            Category::Context => "context",
        }
    }

    /// Capitalized label for human-readable output.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Requirements => "Requirements",
            Category::Technical => "Technical",
            Category::Testing => "Testing",
            Category::Context => "Context",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ReadinessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "requirements" => Ok(Category::Requirements),
            "technical" => Ok(Category::Technical),
            "testing" => Ok(Category::Testing),
            "context" => Ok(Category::Context),
            _ => Err(ReadinessError::UnknownCategory(value.to_string())),
        }
    }
}

/// How much a gap weighs against its category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Minor gap.
    Low,
    /// Gap worth addressing before estimation.
    Medium,
    /// Gap that blocks estimation.
    High,
}

impl Severity {
    /// Stable uppercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ReadinessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            _ => Err(ReadinessError::UnknownSeverity(value.to_string())),
        }
    }
}

/// A readiness deficiency reported by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// Scoring dimension.
    pub category: Category,
    /// Deduction weight.
    pub severity: Severity,
    /// Short label.
    pub title: String,
    /// Human-readable detail.
    pub description: String,
    /// Clarifying questions to ask the ticket owner.
    #[serde(default)]
    pub questions: Vec<String>,
    /// Suggested remediation steps.
    #[serde(default)]
    pub actions: Vec<String>,
}

impl Gap {
    /// Create a gap without questions or actions.
    pub fn new(
        category: Category,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            title: title.into(),
            description: description.into(),
            questions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Attach clarifying questions.
    pub fn with_questions(mut self, questions: &[&str]) -> Self {
        self.questions = questions.iter().map(|q| q.to_string()).collect();
        self
    }

    /// Attach suggested actions.
    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!(" Medium ".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!("LOW".parse::<Severity>().unwrap(), Severity::Low);
    }

    #[test]
    fn unknown_severity_fails_fast() {
        let err = "CRITICAL".parse::<Severity>().unwrap_err();
        assert!(matches!(err, ReadinessError::UnknownSeverity(label) if label == "CRITICAL"));
    }

    #[test]
    fn unknown_category_fails_fast() {
        let err = "security".parse::<Category>().unwrap_err();
        assert!(matches!(err, ReadinessError::UnknownCategory(_)));
    }

    #[test]
    fn unknown_labels_fail_deserialization() {
        let raw = r#"{"category":"requirements","severity":"SEVERE","title":"t","description":"d"}"#;
        assert!(serde_json::from_str::<Gap>(raw).is_err());
    }

    #[test]
    fn ticket_defaults_missing_fields() {
        let ticket: Ticket = serde_json::from_str(r#"{"key":"FSEC-1"}"#).expect("parse ticket");
        assert_eq!(ticket.key, "FSEC-1");
        assert!(ticket.description.is_empty());
        assert!(ticket.comments.is_empty());
        assert!(!ticket.is_estimated());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(Category::Requirements.to_string(), "requirements");
        assert_eq!(Category::Context.title(), "Context");
        assert_eq!(Severity::Medium.to_string(), "MEDIUM");
    }
}
