//! Positive ticket signals shared by strength checks and additive scoring.

use serde::{Deserialize, Serialize};

use crate::text::{TicketText, has_issue_key};

/// A raw predicate over ticket text or metadata.
///
/// Signals look at what is present, never at which gaps were found, so a
/// ticket can carry both a gap and a related strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// Any keyword appears in the description (case-insensitive).
    DescriptionKeywords {
        /// Keywords to look for.
        keywords: Vec<String>,
    },
    /// Any keyword appears in summary, description or comments
    /// (case-insensitive).
    TextKeywords {
        /// Keywords to look for.
        keywords: Vec<String>,
    },
    /// Any marker appears verbatim in the description.
    DescriptionContains {
        /// Case-sensitive markers, e.g. `github.com`.
        markers: Vec<String>,
    },
    /// The description links out to a host or mentions an issue key.
    OutboundReferences {
        /// Hosts whose links count as references.
        hosts: Vec<String>,
    },
    /// The ticket has at least one linked issue.
    LinkedIssues,
    /// The description is longer than a number of characters.
    DescriptionLongerThan {
        /// Exclusive lower bound.
        chars: usize,
    },
}

impl Signal {
    /// Whether the signal is present in the ticket.
    pub fn is_present(&self, text: &TicketText) -> bool {
        match self {
            Signal::DescriptionKeywords { keywords } => {
                contains_keyword(text.description_lower(), keywords)
            }
            Signal::TextKeywords { keywords } => contains_keyword(text.all_lower(), keywords),
            Signal::DescriptionContains { markers } => markers
                .iter()
                .any(|marker| text.description().contains(marker.as_str())),
            Signal::OutboundReferences { hosts } => {
                hosts
                    .iter()
                    .any(|host| text.description().contains(host.as_str()))
                    || has_issue_key(text.description())
            }
            Signal::LinkedIssues => text.link_count() > 0,
            Signal::DescriptionLongerThan { chars } => text.description_len() > *chars,
        }
    }
}

fn contains_keyword(haystack_lower: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| haystack_lower.contains(&keyword.to_lowercase()))
}

/// A labelled positive check reported in the strengths list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthCheck {
    /// Label shown when the signal is present.
    pub label: String,
    /// Predicate to evaluate.
    pub signal: Signal,
}

impl StrengthCheck {
    /// Create a strength check.
    pub fn new(label: impl Into<String>, signal: Signal) -> Self {
        Self {
            label: label.into(),
            signal,
        }
    }
}

/// Labels of every check whose signal is present, in check order.
pub fn collect_strengths(checks: &[StrengthCheck], text: &TicketText) -> Vec<String> {
    checks
        .iter()
        .filter(|check| check.signal.is_present(text))
        .map(|check| check.label.clone())
        .collect()
}
