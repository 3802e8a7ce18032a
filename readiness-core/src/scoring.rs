//! Category scoring strategies.

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Gap, Severity};
use crate::signal::Signal;
use crate::text::TicketText;

/// Points deducted per gap, by severity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionTable {
    /// Points per HIGH gap.
    pub high: u32,
    /// Points per MEDIUM gap.
    pub medium: u32,
    /// Points per LOW gap.
    pub low: u32,
}

impl DeductionTable {
    /// Create a deduction table.
    pub const fn new(high: u32, medium: u32, low: u32) -> Self {
        Self { high, medium, low }
    }

    /// Points deducted for one gap of `severity`.
    pub fn points(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    fn total<'a>(&self, gaps: impl Iterator<Item = &'a Gap>) -> u32 {
        gaps.map(|gap| self.points(gap.severity)).fold(0, u32::saturating_add)
    }

    /// Largest single deduction.
    pub fn largest(&self) -> u32 {
        self.high.max(self.medium).max(self.low)
    }
}

/// Points awarded when a positive signal is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveRule {
    /// Short label for the indicator.
    pub label: String,
    /// Points awarded.
    pub points: u32,
    /// Indicator that must be present.
    pub signal: Signal,
}

/// How a category turns its gaps into a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    /// Start at the maximum and subtract per gap, never below zero.
    Deductive {
        /// Per-severity deductions.
        deductions: DeductionTable,
    },
    /// Start at zero, add per present indicator, subtract per gap, clamp to
    /// `[0, max]`.
    Additive {
        /// Positive indicators.
        rules: Vec<AdditiveRule>,
        /// Per-severity deductions.
        deductions: DeductionTable,
    },
}

/// Weight budget and strategy for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    /// Category this policy scores.
    pub category: Category,
    /// Maximum points.
    pub max: u32,
    /// Scoring strategy.
    #[serde(flatten)]
    pub strategy: Strategy,
}

impl CategoryPolicy {
    /// Deduction table of either strategy.
    pub fn deductions(&self) -> &DeductionTable {
        match &self.strategy {
            Strategy::Deductive { deductions } => deductions,
            Strategy::Additive { deductions, .. } => deductions,
        }
    }

    /// Additive rules; empty for deductive categories.
    pub fn rules(&self) -> &[AdditiveRule] {
        match &self.strategy {
            Strategy::Deductive { .. } => &[],
            Strategy::Additive { rules, .. } => rules,
        }
    }

    /// Score this category from the full gap list.
    pub fn score(&self, gaps: &[Gap], text: &TicketText) -> u32 {
        let own = gaps.iter().filter(|gap| gap.category == self.category);
        match &self.strategy {
            Strategy::Deductive { deductions } => self.max.saturating_sub(deductions.total(own)),
            Strategy::Additive { rules, deductions } => {
                let earned: u32 = rules
                    .iter()
                    .filter(|rule| rule.signal.is_present(text))
                    .map(|rule| rule.points)
                    .fold(0, u32::saturating_add);
                earned.saturating_sub(deductions.total(own)).min(self.max)
            }
        }
    }
}

/// A category's score next to its ceiling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Scored category.
    pub category: Category,
    /// Points earned.
    pub score: u32,
    /// Maximum points.
    pub max: u32,
}

/// Score every policy, preserving policy order.
pub fn score_categories(
    policies: &[CategoryPolicy],
    gaps: &[Gap],
    text: &TicketText,
) -> Vec<CategoryScore> {
    policies
        .iter()
        .map(|policy| CategoryScore {
            category: policy.category,
            score: policy.score(gaps, text),
            max: policy.max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticket;

    fn gap(category: Category, severity: Severity) -> Gap {
        Gap::new(category, severity, "gap", "detail")
    }

    fn empty_text() -> TicketText {
        TicketText::from_ticket(&Ticket::default())
    }

    fn deductive(category: Category, max: u32, table: DeductionTable) -> CategoryPolicy {
        CategoryPolicy {
            category,
            max,
            strategy: Strategy::Deductive { deductions: table },
        }
    }

    fn additive(max: u32) -> CategoryPolicy {
        CategoryPolicy {
            category: Category::Technical,
            max,
            strategy: Strategy::Additive {
                rules: vec![
                    AdditiveRule {
                        label: "infrastructure".to_string(),
                        points: 15,
                        signal: Signal::DescriptionKeywords {
                            keywords: vec!["lambda".to_string()],
                        },
                    },
                    AdditiveRule {
                        label: "implementation".to_string(),
                        points: 15,
                        signal: Signal::DescriptionKeywords {
                            keywords: vec!["deploy".to_string()],
                        },
                    },
                    AdditiveRule {
                        label: "linked".to_string(),
                        points: 20,
                        signal: Signal::DescriptionLongerThan { chars: 0 },
                    },
                ],
                deductions: DeductionTable::new(10, 5, 0),
            },
        }
    }

    fn described(description: &str) -> TicketText {
        TicketText::from_ticket(&Ticket {
            description: description.to_string(),
            ..Ticket::default()
        })
    }

    #[test]
    fn deductive_without_gaps_scores_maximum() {
        let policy = deductive(Category::Requirements, 70, DeductionTable::new(25, 10, 0));
        assert_eq!(policy.score(&[], &empty_text()), 70);
    }

    #[test]
    fn deductive_subtracts_only_own_category() {
        let policy = deductive(Category::Requirements, 70, DeductionTable::new(25, 10, 0));
        let gaps = vec![
            gap(Category::Requirements, Severity::High),
            gap(Category::Requirements, Severity::Medium),
            gap(Category::Technical, Severity::High),
        ];
        assert_eq!(policy.score(&gaps, &empty_text()), 35);
    }

    #[test]
    fn deductive_never_goes_negative() {
        let policy = deductive(Category::Context, 5, DeductionTable::new(5, 0, 0));
        let gaps = vec![
            gap(Category::Context, Severity::High),
            gap(Category::Context, Severity::High),
        ];
        assert_eq!(policy.score(&gaps, &empty_text()), 0);
    }

    #[test]
    fn additive_without_signals_or_gaps_scores_zero() {
        assert_eq!(additive(40).score(&[], &empty_text()), 0);
    }

    #[test]
    fn additive_accumulates_and_deducts() {
        let policy = additive(40);
        let text = described("deploy the lambda");
        assert_eq!(policy.score(&[], &text), 40);

        let gaps = vec![gap(Category::Technical, Severity::Medium)];
        assert_eq!(policy.score(&gaps, &described("deploy it")), 15 + 20 - 5);
    }

    #[test]
    fn additive_clamps_to_bounds() {
        let policy = additive(30);
        assert_eq!(policy.score(&[], &described("deploy the lambda")), 30);

        let gaps = vec![
            gap(Category::Technical, Severity::High),
            gap(Category::Technical, Severity::High),
            gap(Category::Technical, Severity::High),
        ];
        assert_eq!(policy.score(&gaps, &described("x")), 0);
    }

    #[test]
    fn oversized_deductions_saturate_instead_of_overflowing() {
        let policy = deductive(Category::Requirements, 70, DeductionTable::new(u32::MAX, 0, 0));
        let gaps = vec![
            gap(Category::Requirements, Severity::High),
            gap(Category::Requirements, Severity::High),
        ];
        assert_eq!(policy.score(&gaps, &empty_text()), 0);
    }

    #[test]
    fn oversized_rule_points_saturate_and_clamp() {
        let mut policy = additive(40);
        if let Strategy::Additive { rules, .. } = &mut policy.strategy {
            for rule in rules.iter_mut() {
                rule.points = u32::MAX;
            }
        }
        assert_eq!(policy.score(&[], &described("deploy the lambda")), 40);
        assert_eq!(policy.rules().len(), 3);
        assert_eq!(policy.deductions().largest(), 10);
    }

    #[test]
    fn score_categories_preserves_policy_order() {
        let policies = vec![
            deductive(Category::Context, 15, DeductionTable::new(10, 5, 2)),
            deductive(Category::Testing, 5, DeductionTable::new(5, 5, 2)),
        ];
        let gaps = vec![gap(Category::Testing, Severity::Low)];
        let scores = score_categories(&policies, &gaps, &empty_text());
        assert_eq!(scores[0].category, Category::Context);
        assert_eq!(scores[0].score, 15);
        assert_eq!(scores[1].score, 3);
        assert_eq!(scores[1].max, 5);
    }

    #[test]
    fn policy_json_flattens_strategy_tag() {
        let policy = deductive(Category::Testing, 5, DeductionTable::new(5, 5, 5));
        let value = serde_json::to_value(&policy).expect("serialize");
        assert_eq!(value["strategy"], "deductive");
        assert_eq!(value["category"], "testing");
        let back: CategoryPolicy = serde_json::from_value(value).expect("parse");
        assert_eq!(back, policy);
    }
}
