//! Scoring profiles: the Standard policy and the FSEC team policy.
//!
//! Point values, thresholds and keyword lists are hand-tuned. They are named
//! constants so a profile file can override any of them without code changes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::detectors::{
    AcceptanceCriteriaConfig, AmbiguityConfig, AmbiguityTier, DependencyConfig, DetectorSpec,
    ImplementationClarityConfig, InfrastructureContextConfig, ProblemStatementConfig,
    ReferenceConfig, ScopeCreepConfig, SecurityContextConfig, SecurityEmphasis,
    TechnicalContextConfig, TestEmphasis, TestScenarioConfig,
};
use crate::domain::{Category, Severity};
use crate::error::{ReadinessError, Result};
use crate::scoring::{AdditiveRule, CategoryPolicy, DeductionTable, Strategy};
use crate::signal::{Signal, StrengthCheck};

/// Ceiling of the total score; no single category, deduction or rule may exceed it.
pub const MAX_TOTAL_SCORE: u32 = 100;

/// Name of the general-purpose profile.
pub const STANDARD_PROFILE: &str = "standard";
/// Name of the infrastructure team profile.
pub const FSEC_PROFILE: &str = "fsec";

/// Standard: requirements ceiling.
pub const STANDARD_REQUIREMENTS_MAX: u32 = 70;
/// Standard: technical ceiling.
pub const STANDARD_TECHNICAL_MAX: u32 = 20;
/// Standard: testing ceiling.
pub const STANDARD_TESTING_MAX: u32 = 5;
/// Standard: context ceiling.
pub const STANDARD_CONTEXT_MAX: u32 = 5;
/// Standard: requirements deductions.
pub const STANDARD_REQUIREMENTS_DEDUCTIONS: DeductionTable = DeductionTable::new(25, 10, 0);
/// Standard: technical deductions.
pub const STANDARD_TECHNICAL_DEDUCTIONS: DeductionTable = DeductionTable::new(15, 8, 0);
/// Standard: any testing gap empties the category.
pub const STANDARD_TESTING_DEDUCTIONS: DeductionTable = DeductionTable::new(5, 5, 5);
/// Standard: only HIGH context gaps count.
pub const STANDARD_CONTEXT_DEDUCTIONS: DeductionTable = DeductionTable::new(5, 0, 0);
/// Standard: total needed for "ready".
pub const STANDARD_READY_THRESHOLD: u32 = 75;
/// Standard: requirements score needed for "ready".
pub const STANDARD_REQUIREMENTS_FLOOR: u32 = 50;
/// Standard: total labelled excellent.
pub const STANDARD_EXCELLENT_SCORE: u32 = 90;
/// Standard: below this total a ticket needs significant work.
pub const STANDARD_LOW_WATER_SCORE: u32 = 60;
/// Standard: hedging excerpts quoted in a vague-language gap.
pub const STANDARD_EXCERPT_LIMIT: usize = 3;

/// FSEC: requirements ceiling.
pub const FSEC_REQUIREMENTS_MAX: u32 = 40;
/// FSEC: technical ceiling.
pub const FSEC_TECHNICAL_MAX: u32 = 40;
/// FSEC: context ceiling.
pub const FSEC_CONTEXT_MAX: u32 = 15;
/// FSEC: testing ceiling.
pub const FSEC_TESTING_MAX: u32 = 5;
/// FSEC: requirements deductions.
pub const FSEC_REQUIREMENTS_DEDUCTIONS: DeductionTable = DeductionTable::new(15, 5, 0);
/// FSEC: deductions applied after the additive technical indicators.
pub const FSEC_TECHNICAL_DEDUCTIONS: DeductionTable = DeductionTable::new(10, 5, 0);
/// FSEC: context deductions.
pub const FSEC_CONTEXT_DEDUCTIONS: DeductionTable = DeductionTable::new(10, 5, 2);
/// FSEC: a missing verification approach costs two points.
pub const FSEC_TESTING_DEDUCTIONS: DeductionTable = DeductionTable::new(5, 5, 2);
/// FSEC: points for infrastructure vocabulary.
pub const FSEC_INFRASTRUCTURE_POINTS: u32 = 15;
/// FSEC: points for implementation verbs.
pub const FSEC_IMPLEMENTATION_POINTS: u32 = 15;
/// FSEC: points for outbound references.
pub const FSEC_REFERENCE_POINTS: u32 = 10;
/// FSEC: total needed for "ready".
pub const FSEC_READY_THRESHOLD: u32 = 60;
/// FSEC: requirements score needed for "ready".
pub const FSEC_REQUIREMENTS_FLOOR: u32 = 25;
/// FSEC: total labelled excellent.
pub const FSEC_EXCELLENT_SCORE: u32 = 80;
/// FSEC: below this total a ticket needs significant work.
pub const FSEC_LOW_WATER_SCORE: u32 = 45;
/// FSEC: blocker excerpts quoted in a critical-ambiguity gap.
pub const FSEC_EXCERPT_LIMIT: usize = 2;

/// Descriptions longer than this earn the "Detailed description" strength.
pub const DETAILED_DESCRIPTION_CHARS: usize = 200;

const BUG_LIKE_TYPES: &[&str] = &["bug", "incident", "hotfix"];
const EXPLORATORY_TYPES: &[&str] = &["spike", "research"];
const REFERENCE_HOSTS: &[&str] = &["github.com", "slack.com"];

const AC_KEYWORDS: &[&str] = &[
    "acceptance criteria",
    "AC:",
    "definition of done",
    "success criteria",
    "given",
    "when",
    "then",
];
const HEDGING_WORDS: &[&str] = &[
    "maybe",
    "probably",
    "might",
    "could",
    "possibly",
    "something like",
    "similar to",
    "kind of",
    "etc",
    "and so on",
];
const INCOMPLETE_MARKERS: &[&str] = &["TBD", "TODO", "???", "unclear", "..."];
const CRITICAL_MARKERS: &[&str] = &["TBD", "TODO", "???", "unclear", "figure it out"];
const TECH_KEYWORDS: &[&str] = &[
    "api",
    "endpoint",
    "database",
    "table",
    "schema",
    "component",
    "service",
    "architecture",
];
const TECH_SECTION_QUALIFIERS: &[&str] = &["approach", "design", "notes"];
const DEPENDENCY_PHRASES: &[&str] = &["depends on", "blocked by", "requires", "needs", "after"];
const TEST_KEYWORDS: &[&str] = &[
    "test",
    "happy path",
    "edge case",
    "error handling",
    "scenario",
    "verify",
];
const TEST_PLAN_QUALIFIERS: &[&str] = &["scenario", "case", "plan"];
const ADDITIVE_PHRASES: &[&str] = &[
    "also",
    "additionally",
    "we should also",
    "another thing",
    "plus",
];
const SECURITY_KEYWORDS: &[&str] = &[
    "password",
    "token",
    "auth",
    "permission",
    "pii",
    "gdpr",
    "encryption",
    "security",
];
const SECURITY_DISCUSSION: &[&str] = &["security", "compliance"];

const PROBLEM_INDICATORS: &[&str] = &[
    "problem",
    "issue",
    "currently",
    "need to",
    "should",
    "request",
    "broken",
    "failing",
];
const INFRASTRUCTURE_KEYWORDS: &[&str] = &[
    "account",
    "lambda",
    "s3",
    "iam",
    "api",
    "policy",
    "kms",
    "ec2",
    "vpc",
    "scp",
    "role",
    "cloudformation",
    "terraform",
];
const IMPLEMENTATION_KEYWORDS: &[&str] = &[
    "create",
    "update",
    "modify",
    "deploy",
    "configure",
    "implement",
    "add",
    "remove",
    "migrate",
    "move",
];
const FSEC_SECURITY_KEYWORDS: &[&str] = &[
    "iam",
    "policy",
    "role",
    "permission",
    "auth",
    "encryption",
    "kms",
    "security",
    "compliance",
];
const FSEC_SECURITY_DISCUSSION: &[&str] = &["security", "iam policy"];
const FSEC_TEST_KEYWORDS: &[&str] = &["test", "verify", "validate", "check"];

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// A named readiness policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringProfile {
    /// Profile name, reported in every analysis.
    pub name: String,
    /// One policy per category, in display order.
    pub categories: Vec<CategoryPolicy>,
    /// Total score needed for "ready".
    pub ready_threshold: u32,
    /// Requirements score needed for "ready".
    pub requirements_floor: u32,
    /// Total score labelled excellent.
    pub excellent_score: u32,
    /// Below this total the ticket needs significant work.
    pub low_water_score: u32,
    /// Detectors in execution order.
    pub detectors: Vec<DetectorSpec>,
    /// Strength checks in report order.
    pub strengths: Vec<StrengthCheck>,
}

impl ScoringProfile {
    /// The general-purpose profile.
    pub fn standard() -> Self {
        Self {
            name: STANDARD_PROFILE.to_string(),
            categories: vec![
                deductive(
                    Category::Requirements,
                    STANDARD_REQUIREMENTS_MAX,
                    STANDARD_REQUIREMENTS_DEDUCTIONS,
                ),
                deductive(
                    Category::Technical,
                    STANDARD_TECHNICAL_MAX,
                    STANDARD_TECHNICAL_DEDUCTIONS,
                ),
                deductive(Category::Testing, STANDARD_TESTING_MAX, STANDARD_TESTING_DEDUCTIONS),
                deductive(Category::Context, STANDARD_CONTEXT_MAX, STANDARD_CONTEXT_DEDUCTIONS),
            ],
            ready_threshold: STANDARD_READY_THRESHOLD,
            requirements_floor: STANDARD_REQUIREMENTS_FLOOR,
            excellent_score: STANDARD_EXCELLENT_SCORE,
            low_water_score: STANDARD_LOW_WATER_SCORE,
            detectors: standard_detectors(),
            strengths: vec![
                StrengthCheck::new(
                    "Has acceptance criteria",
                    Signal::DescriptionKeywords {
                        keywords: words(AC_KEYWORDS),
                    },
                ),
                StrengthCheck::new(
                    "Test scenarios discussed",
                    Signal::TextKeywords {
                        keywords: words(TEST_KEYWORDS),
                    },
                ),
                StrengthCheck::new(
                    "Technical context provided",
                    Signal::DescriptionKeywords {
                        keywords: words(TECH_KEYWORDS),
                    },
                ),
                StrengthCheck::new("Dependencies linked", Signal::LinkedIssues),
                StrengthCheck::new(
                    "Detailed description",
                    Signal::DescriptionLongerThan {
                        chars: DETAILED_DESCRIPTION_CHARS,
                    },
                ),
            ],
        }
    }

    /// The infrastructure team profile: lighter on formal acceptance
    /// criteria, heavier on technical context, lower bar for "ready".
    pub fn fsec() -> Self {
        Self {
            name: FSEC_PROFILE.to_string(),
            categories: vec![
                deductive(
                    Category::Requirements,
                    FSEC_REQUIREMENTS_MAX,
                    FSEC_REQUIREMENTS_DEDUCTIONS,
                ),
                CategoryPolicy {
                    category: Category::Technical,
                    max: FSEC_TECHNICAL_MAX,
                    strategy: Strategy::Additive {
                        rules: vec![
                            AdditiveRule {
                                label: "infrastructure context".to_string(),
                                points: FSEC_INFRASTRUCTURE_POINTS,
                                signal: Signal::DescriptionKeywords {
                                    keywords: words(INFRASTRUCTURE_KEYWORDS),
                                },
                            },
                            AdditiveRule {
                                label: "implementation clarity".to_string(),
                                points: FSEC_IMPLEMENTATION_POINTS,
                                signal: Signal::DescriptionKeywords {
                                    keywords: words(IMPLEMENTATION_KEYWORDS),
                                },
                            },
                            AdditiveRule {
                                label: "references".to_string(),
                                points: FSEC_REFERENCE_POINTS,
                                signal: Signal::OutboundReferences {
                                    hosts: words(REFERENCE_HOSTS),
                                },
                            },
                        ],
                        deductions: FSEC_TECHNICAL_DEDUCTIONS,
                    },
                },
                deductive(Category::Context, FSEC_CONTEXT_MAX, FSEC_CONTEXT_DEDUCTIONS),
                deductive(Category::Testing, FSEC_TESTING_MAX, FSEC_TESTING_DEDUCTIONS),
            ],
            ready_threshold: FSEC_READY_THRESHOLD,
            requirements_floor: FSEC_REQUIREMENTS_FLOOR,
            excellent_score: FSEC_EXCELLENT_SCORE,
            low_water_score: FSEC_LOW_WATER_SCORE,
            detectors: fsec_detectors(),
            strengths: vec![
                StrengthCheck::new(
                    "Clear problem or request",
                    Signal::DescriptionKeywords {
                        keywords: words(PROBLEM_INDICATORS),
                    },
                ),
                StrengthCheck::new(
                    "AWS infrastructure context",
                    Signal::DescriptionKeywords {
                        keywords: words(INFRASTRUCTURE_KEYWORDS),
                    },
                ),
                StrengthCheck::new(
                    "Clear implementation approach",
                    Signal::DescriptionKeywords {
                        keywords: words(IMPLEMENTATION_KEYWORDS),
                    },
                ),
                StrengthCheck::new(
                    "Code references",
                    Signal::DescriptionContains {
                        markers: words(&["github.com"]),
                    },
                ),
                StrengthCheck::new(
                    "Slack thread linked",
                    Signal::DescriptionContains {
                        markers: words(&["slack.com"]),
                    },
                ),
                StrengthCheck::new("Related tickets linked", Signal::LinkedIssues),
                StrengthCheck::new(
                    "Detailed description",
                    Signal::DescriptionLongerThan {
                        chars: DETAILED_DESCRIPTION_CHARS,
                    },
                ),
            ],
        }
    }

    /// Look up a built-in profile by name (case-insensitive).
    pub fn builtin(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            STANDARD_PROFILE => Ok(Self::standard()),
            FSEC_PROFILE => Ok(Self::fsec()),
            _ => Err(ReadinessError::UnknownProfile(name.to_string())),
        }
    }

    /// Parse a profile from JSON and validate it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Policy for one category.
    pub fn policy(&self, category: Category) -> Option<&CategoryPolicy> {
        self.categories
            .iter()
            .find(|policy| policy.category == category)
    }

    /// The readiness verdict: both the total and the requirements score must
    /// clear their bars.
    pub fn is_ready(&self, total: u32, requirements: u32) -> bool {
        total >= self.ready_threshold && requirements >= self.requirements_floor
    }

    /// Check the structural rules every profile must satisfy.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| ReadinessError::InvalidProfile {
            profile: self.name.clone(),
            message,
        };

        let mut seen = BTreeSet::new();
        for policy in &self.categories {
            if !seen.insert(policy.category) {
                return Err(invalid(format!("category {} configured twice", policy.category)));
            }
        }
        if let Some(missing) = Category::ALL.iter().find(|c| !seen.contains(*c)) {
            return Err(invalid(format!("category {missing} is not configured")));
        }

        for policy in &self.categories {
            if policy.max > MAX_TOTAL_SCORE {
                return Err(invalid(format!(
                    "category {} maximum {} exceeds {MAX_TOTAL_SCORE}",
                    policy.category, policy.max
                )));
            }
            let deduction = policy.deductions().largest();
            if deduction > MAX_TOTAL_SCORE {
                return Err(invalid(format!(
                    "category {} deduction {deduction} exceeds {MAX_TOTAL_SCORE}",
                    policy.category
                )));
            }
            if let Some(rule) = policy.rules().iter().find(|r| r.points > MAX_TOTAL_SCORE) {
                return Err(invalid(format!(
                    "category {} rule '{}' awards {} points, more than {MAX_TOTAL_SCORE}",
                    policy.category, rule.label, rule.points
                )));
            }
        }

        let total: u64 = self
            .categories
            .iter()
            .map(|policy| u64::from(policy.max))
            .sum();
        if total != u64::from(MAX_TOTAL_SCORE) {
            return Err(invalid(format!(
                "category maxima sum to {total}, expected 100"
            )));
        }

        let requirements_max = self
            .policy(Category::Requirements)
            .map(|policy| policy.max)
            .unwrap_or_default();
        if self.requirements_floor > requirements_max {
            return Err(invalid(format!(
                "requirements floor {} exceeds requirements maximum {requirements_max}",
                self.requirements_floor
            )));
        }
        if !(self.low_water_score <= self.ready_threshold
            && self.ready_threshold <= self.excellent_score
            && self.excellent_score <= MAX_TOTAL_SCORE)
        {
            return Err(invalid(format!(
                "score tiers must satisfy low-water {} <= threshold {} <= excellent {} <= 100",
                self.low_water_score, self.ready_threshold, self.excellent_score
            )));
        }
        if self.detectors.is_empty() {
            return Err(invalid("no detectors configured".to_string()));
        }
        Ok(())
    }
}

fn deductive(category: Category, max: u32, deductions: DeductionTable) -> CategoryPolicy {
    CategoryPolicy {
        category,
        max,
        strategy: Strategy::Deductive { deductions },
    }
}

/// Detector list of the Standard profile, in execution order.
pub fn standard_detectors() -> Vec<DetectorSpec> {
    vec![
        DetectorSpec::AcceptanceCriteria(AcceptanceCriteriaConfig {
            keywords: words(AC_KEYWORDS),
            exempt_types: words(BUG_LIKE_TYPES),
        }),
        DetectorSpec::Ambiguity(AmbiguityConfig {
            tier: AmbiguityTier::Vague,
            hedging: words(HEDGING_WORDS),
            markers: words(INCOMPLETE_MARKERS),
            excerpt_limit: STANDARD_EXCERPT_LIMIT,
        }),
        DetectorSpec::TechnicalContext(TechnicalContextConfig {
            keywords: words(TECH_KEYWORDS),
            section_marker: "technical".to_string(),
            section_qualifiers: words(TECH_SECTION_QUALIFIERS),
            exempt_types: words(BUG_LIKE_TYPES),
        }),
        DetectorSpec::Dependencies(DependencyConfig {
            phrases: words(DEPENDENCY_PHRASES),
        }),
        DetectorSpec::TestScenarios(TestScenarioConfig {
            emphasis: TestEmphasis::Scenarios,
            keywords: words(TEST_KEYWORDS),
            plan_qualifiers: words(TEST_PLAN_QUALIFIERS),
            exempt_types: words(EXPLORATORY_TYPES),
        }),
        DetectorSpec::ScopeCreep(ScopeCreepConfig {
            min_comments: 5,
            min_additive_comments: 3,
            phrases: words(ADDITIVE_PHRASES),
        }),
        DetectorSpec::SecurityContext(SecurityContextConfig {
            emphasis: SecurityEmphasis::Review,
            severity: Severity::High,
            keywords: words(SECURITY_KEYWORDS),
            discussion_markers: words(SECURITY_DISCUSSION),
            max_text_len: None,
        }),
    ]
}

/// Detector list of the FSEC profile, in execution order.
pub fn fsec_detectors() -> Vec<DetectorSpec> {
    vec![
        DetectorSpec::ProblemStatement(ProblemStatementConfig {
            indicators: words(PROBLEM_INDICATORS),
            substantial_len: 50,
        }),
        DetectorSpec::Ambiguity(AmbiguityConfig {
            tier: AmbiguityTier::Critical,
            hedging: Vec::new(),
            markers: words(CRITICAL_MARKERS),
            excerpt_limit: FSEC_EXCERPT_LIMIT,
        }),
        DetectorSpec::InfrastructureContext(InfrastructureContextConfig {
            keywords: words(INFRASTRUCTURE_KEYWORDS),
            min_description_len: 100,
            exempt_types: words(EXPLORATORY_TYPES),
        }),
        DetectorSpec::ImplementationClarity(ImplementationClarityConfig {
            keywords: words(IMPLEMENTATION_KEYWORDS),
            substantial_len: 100,
        }),
        DetectorSpec::References(ReferenceConfig {
            hosts: words(REFERENCE_HOSTS),
            min_description_len: 100,
        }),
        DetectorSpec::SecurityContext(SecurityContextConfig {
            emphasis: SecurityEmphasis::Implications,
            severity: Severity::Medium,
            keywords: words(FSEC_SECURITY_KEYWORDS),
            discussion_markers: words(FSEC_SECURITY_DISCUSSION),
            max_text_len: Some(300),
        }),
        DetectorSpec::TestScenarios(TestScenarioConfig {
            emphasis: TestEmphasis::Validation,
            keywords: words(FSEC_TEST_KEYWORDS),
            plan_qualifiers: words(TEST_PLAN_QUALIFIERS),
            exempt_types: Vec::new(),
        }),
    ]
}
