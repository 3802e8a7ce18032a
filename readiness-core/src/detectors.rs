//! Detector registry and the built-in readiness checks.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detector::Detector;
use crate::domain::{Category, Gap, Severity};
use crate::error::{ReadinessError, Result};
use crate::text::{ExcerptFinder, TicketText, contains_any, dedup_excerpts, has_issue_key, lowercase_all};

static GIVEN_WHEN_THEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bgiven\b.*\bwhen\b.*\bthen\b").expect("given/when/then pattern")
});
static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-*•]\s*\[").expect("checkbox pattern"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*•]\s+").expect("bullet pattern"));

/// Serializable description of one detector and its configuration.
///
/// A profile's detector list is a sequence of these; order is the order gaps
/// appear in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorSpec {
    /// Definition-of-done check.
    AcceptanceCriteria(AcceptanceCriteriaConfig),
    /// Hedging language and incompleteness markers.
    Ambiguity(AmbiguityConfig),
    /// Implementation-relevant vocabulary or a technical section.
    TechnicalContext(TechnicalContextConfig),
    /// Infrastructure vocabulary in short descriptions.
    InfrastructureContext(InfrastructureContextConfig),
    /// Concrete implementation verbs in short descriptions.
    ImplementationClarity(ImplementationClarityConfig),
    /// Dependency language without linked issues.
    Dependencies(DependencyConfig),
    /// Test vocabulary or a test-plan section.
    TestScenarios(TestScenarioConfig),
    /// Requirements growing through comments.
    ScopeCreep(ScopeCreepConfig),
    /// Security-sensitive vocabulary without security discussion.
    SecurityContext(SecurityContextConfig),
    /// Problem framing in the description.
    ProblemStatement(ProblemStatementConfig),
    /// Outbound references from short descriptions.
    References(ReferenceConfig),
}

/// Build detector instances from their specs, preserving order.
pub fn build_detectors(specs: &[DetectorSpec]) -> Result<Vec<Box<dyn Detector + Send + Sync>>> {
    let mut detectors: Vec<Box<dyn Detector + Send + Sync>> = Vec::with_capacity(specs.len());
    for spec in specs {
        let detector = match spec {
            DetectorSpec::AcceptanceCriteria(config) => {
                Box::new(AcceptanceCriteriaDetector::new(config)) as Box<_>
            }
            DetectorSpec::Ambiguity(config) => Box::new(AmbiguityDetector::new(config)?) as Box<_>,
            DetectorSpec::TechnicalContext(config) => {
                Box::new(TechnicalContextDetector::new(config)) as Box<_>
            }
            DetectorSpec::InfrastructureContext(config) => {
                Box::new(InfrastructureContextDetector::new(config)) as Box<_>
            }
            DetectorSpec::ImplementationClarity(config) => {
                Box::new(ImplementationClarityDetector::new(config)) as Box<_>
            }
            DetectorSpec::Dependencies(config) => {
                Box::new(DependencyDetector::new(config)?) as Box<_>
            }
            DetectorSpec::TestScenarios(config) => {
                Box::new(TestScenarioDetector::new(config)) as Box<_>
            }
            DetectorSpec::ScopeCreep(config) => Box::new(ScopeCreepDetector::new(config)?) as Box<_>,
            DetectorSpec::SecurityContext(config) => {
                Box::new(SecurityContextDetector::new(config)) as Box<_>
            }
            DetectorSpec::ProblemStatement(config) => {
                Box::new(ProblemStatementDetector::new(config)) as Box<_>
            }
            DetectorSpec::References(config) => Box::new(ReferenceDetector::new(config)) as Box<_>,
        };
        detectors.push(detector);
    }
    Ok(detectors)
}

/// Compile a case-insensitive, word-bounded alternation of literal phrases.
fn phrase_pattern(detector: &'static str, phrases: &[String]) -> Result<Regex> {
    let alternation = phrases
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\b"))
        .map_err(|source| ReadinessError::Pattern { detector, source })
}

fn excerpt_finders(detector: &'static str, terms: &[String]) -> Result<Vec<ExcerptFinder>> {
    terms
        .iter()
        .map(|term| {
            ExcerptFinder::new(term).map_err(|source| ReadinessError::Pattern { detector, source })
        })
        .collect()
}

fn quote_all(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|item| format!("\"{item}\"")).collect()
}

/// Configuration for [`AcceptanceCriteriaDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceCriteriaConfig {
    /// Phrases that count as an explicit acceptance-criteria section.
    pub keywords: Vec<String>,
    /// Issue types that do not need acceptance criteria.
    pub exempt_types: Vec<String>,
}

struct AcceptanceCriteriaDetector {
    keywords: Vec<String>,
    exempt_types: Vec<String>,
}

impl AcceptanceCriteriaDetector {
    fn new(config: &AcceptanceCriteriaConfig) -> Self {
        Self {
            keywords: lowercase_all(&config.keywords),
            exempt_types: config.exempt_types.clone(),
        }
    }
}

impl Detector for AcceptanceCriteriaDetector {
    fn id(&self) -> &'static str {
        "acceptance-criteria"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let description = text.description();
        let has_section = contains_any(text.description_lower(), &self.keywords);
        let has_gwt = GIVEN_WHEN_THEN.is_match(text.description_lower());
        let has_list = CHECKBOX.is_match(description) || BULLET.is_match(description);

        if has_section || has_gwt || has_list || text.is_type_in(&self.exempt_types) {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Requirements,
                Severity::High,
                "Missing Acceptance Criteria",
                "No clear definition of \"done\". What specific, testable conditions must be met?",
            )
            .with_questions(&[
                "What are the success criteria?",
                "How will we know this is working correctly?",
                "What edge cases must be handled?",
            ])
            .with_actions(&[
                "Schedule 15-min session with PO to define AC",
                "Use format: Given [context], When [action], Then [outcome]",
                "Document at least 2-3 criteria for features",
            ]),
        ]
    }
}

/// Which ambiguity policy a detector enforces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityTier {
    /// Flags hedging words as well as incompleteness markers.
    Vague,
    /// Flags only hard incompleteness markers; hedging is tolerated.
    Critical,
}

/// Configuration for [`AmbiguityDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguityConfig {
    /// Policy tier.
    pub tier: AmbiguityTier,
    /// Hedging words, matched case-insensitively.
    #[serde(default)]
    pub hedging: Vec<String>,
    /// Incompleteness markers, matched case-sensitively.
    pub markers: Vec<String>,
    /// Maximum examples quoted in the gap description.
    pub excerpt_limit: usize,
}

struct AmbiguityDetector {
    tier: AmbiguityTier,
    hedging: Vec<ExcerptFinder>,
    markers: Vec<ExcerptFinder>,
    excerpt_limit: usize,
}

impl AmbiguityDetector {
    fn new(config: &AmbiguityConfig) -> Result<Self> {
        Ok(Self {
            tier: config.tier,
            hedging: excerpt_finders("ambiguity", &config.hedging)?,
            markers: excerpt_finders("ambiguity", &config.markers)?,
            excerpt_limit: config.excerpt_limit,
        })
    }

    fn examples(&self, text: &TicketText) -> Vec<String> {
        let all_text = text.all_text();
        let hedges: Vec<String> = self
            .hedging
            .iter()
            .filter(|finder| text.all_lower().contains(&finder.term().to_lowercase()))
            .filter_map(|finder| finder.first_excerpt(all_text))
            .collect();
        if !hedges.is_empty() {
            return quote_all(dedup_excerpts(hedges, self.excerpt_limit));
        }

        let present = self
            .markers
            .iter()
            .filter(|finder| all_text.contains(finder.term()));
        match self.tier {
            AmbiguityTier::Vague => present
                .take(self.excerpt_limit)
                .map(|finder| finder.term().to_string())
                .collect(),
            AmbiguityTier::Critical => {
                let excerpts = present
                    .filter_map(|finder| finder.first_excerpt(all_text))
                    .collect();
                quote_all(dedup_excerpts(excerpts, self.excerpt_limit))
            }
        }
    }
}

impl Detector for AmbiguityDetector {
    fn id(&self) -> &'static str {
        match self.tier {
            AmbiguityTier::Vague => "vague-language",
            AmbiguityTier::Critical => "critical-ambiguity",
        }
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let examples = self.examples(text);
        if examples.is_empty() {
            return Vec::new();
        }
        let examples = examples.join(", ");

        let gap = match self.tier {
            AmbiguityTier::Vague => Gap::new(
                Category::Requirements,
                Severity::High,
                "Vague or Ambiguous Requirements",
                format!("Found ambiguous language: {examples}"),
            )
            .with_questions(&[
                "What are the specific requirements?",
                "Can we remove uncertainty and be more precise?",
                "What decisions need to be made?",
            ])
            .with_actions(&[
                "Convert vague statements to specific questions",
                "Assign questions to stakeholders for answers",
                "Update ticket with specific requirements",
            ]),
            AmbiguityTier::Critical => Gap::new(
                Category::Requirements,
                Severity::High,
                "Critical Ambiguity",
                format!("Found blockers: {examples}"),
            )
            .with_questions(&["What needs to be decided before we can estimate?"])
            .with_actions(&[
                "Convert TBD/TODO into specific questions",
                "Assign owners to open questions",
            ]),
        };
        vec![gap]
    }
}

/// Configuration for [`TechnicalContextDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalContextConfig {
    /// Implementation-relevant nouns.
    pub keywords: Vec<String>,
    /// Word that opens a technical section, e.g. "technical".
    pub section_marker: String,
    /// Words that, together with the marker, identify the section.
    pub section_qualifiers: Vec<String>,
    /// Issue types that do not need upfront technical design.
    pub exempt_types: Vec<String>,
}

struct TechnicalContextDetector {
    keywords: Vec<String>,
    section_marker: String,
    section_qualifiers: Vec<String>,
    exempt_types: Vec<String>,
}

impl TechnicalContextDetector {
    fn new(config: &TechnicalContextConfig) -> Self {
        Self {
            keywords: lowercase_all(&config.keywords),
            section_marker: config.section_marker.to_lowercase(),
            section_qualifiers: lowercase_all(&config.section_qualifiers),
            exempt_types: config.exempt_types.clone(),
        }
    }
}

impl Detector for TechnicalContextDetector {
    fn id(&self) -> &'static str {
        "technical-context"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        if text.is_type_in(&self.exempt_types) {
            return Vec::new();
        }
        let description = text.description_lower();
        let has_keywords = contains_any(description, &self.keywords);
        let has_section = description.contains(&self.section_marker)
            && contains_any(description, &self.section_qualifiers);
        if has_keywords || has_section {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Technical,
                Severity::Medium,
                "No Technical Context",
                "No discussion of implementation approach.",
            )
            .with_questions(&[
                "Which components/services are affected?",
                "Are new API endpoints needed?",
                "Are database schema changes required?",
                "What is the high-level technical approach?",
            ])
            .with_actions(&[
                "Tech lead to sketch approach in ticket",
                "Identify 2-3 possible approaches if unclear",
                "Note any major technical decisions needed",
                "List affected components and services",
            ]),
        ]
    }
}

/// Configuration for [`InfrastructureContextDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureContextConfig {
    /// Infrastructure nouns (accounts, services, IaC tools).
    pub keywords: Vec<String>,
    /// Descriptions at least this long are never flagged.
    pub min_description_len: usize,
    /// Issue types that are exploratory by nature.
    pub exempt_types: Vec<String>,
}

struct InfrastructureContextDetector {
    keywords: Vec<String>,
    min_description_len: usize,
    exempt_types: Vec<String>,
}

impl InfrastructureContextDetector {
    fn new(config: &InfrastructureContextConfig) -> Self {
        Self {
            keywords: lowercase_all(&config.keywords),
            min_description_len: config.min_description_len,
            exempt_types: config.exempt_types.clone(),
        }
    }
}

impl Detector for InfrastructureContextDetector {
    fn id(&self) -> &'static str {
        "infrastructure-context"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        if text.is_type_in(&self.exempt_types)
            || contains_any(text.description_lower(), &self.keywords)
            || text.description_len() >= self.min_description_len
        {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Technical,
                Severity::Medium,
                "Limited AWS Context",
                "Minimal technical details about affected systems.",
            )
            .with_questions(&[
                "Which AWS accounts/services are affected?",
                "What infrastructure components need changes?",
            ])
            .with_actions(&[
                "List affected accounts, services, or modules",
                "Add links to relevant code or AWS console",
            ]),
        ]
    }
}

/// Configuration for [`ImplementationClarityDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationClarityConfig {
    /// Verbs describing concrete implementation work.
    pub keywords: Vec<String>,
    /// Descriptions longer than this are treated as substantial.
    pub substantial_len: usize,
}

struct ImplementationClarityDetector {
    keywords: Vec<String>,
    substantial_len: usize,
}

impl ImplementationClarityDetector {
    fn new(config: &ImplementationClarityConfig) -> Self {
        Self {
            keywords: lowercase_all(&config.keywords),
            substantial_len: config.substantial_len,
        }
    }
}

impl Detector for ImplementationClarityDetector {
    fn id(&self) -> &'static str {
        "implementation-clarity"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let has_action = contains_any(text.description_lower(), &self.keywords);
        let has_substance = text.description_len() > self.substantial_len;
        if has_action || has_substance {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Technical,
                Severity::Medium,
                "Unclear Implementation",
                "No clear description of what to build or change.",
            )
            .with_questions(&[
                "What specifically needs to be created/modified?",
                "What is the high-level approach?",
            ])
            .with_actions(&["Add implementation details", "Describe the solution approach"]),
        ]
    }
}

/// Configuration for [`DependencyDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Phrases that announce a dependency.
    pub phrases: Vec<String>,
}

struct DependencyDetector {
    pattern: Regex,
}

impl DependencyDetector {
    fn new(config: &DependencyConfig) -> Result<Self> {
        Ok(Self {
            pattern: phrase_pattern("dependencies", &config.phrases)?,
        })
    }
}

impl Detector for DependencyDetector {
    fn id(&self) -> &'static str {
        "dependencies"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let mentions_dependency =
            self.pattern.is_match(text.all_text()) || has_issue_key(text.all_text());
        if !mentions_dependency || text.link_count() > 0 {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Technical,
                Severity::Medium,
                "Missing Dependencies",
                "Description mentions dependencies but no linked tickets.",
            )
            .with_questions(&[
                "Which tickets must be completed first?",
                "What are the blocking dependencies?",
                "Are there external service dependencies?",
            ])
            .with_actions(&[
                "Link to dependent tickets",
                "Add \"blocked by\" relationships if applicable",
                "Document any external service dependencies",
                "Clarify which dependencies are hard blockers",
            ]),
        ]
    }
}

/// How much verification a [`TestScenarioDetector`] asks for.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestEmphasis {
    /// Full test scenarios: happy path, edge cases, error handling.
    #[default]
    Scenarios,
    /// A single validation step is enough.
    Validation,
}

/// Configuration for [`TestScenarioDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScenarioConfig {
    /// Which kind of verification to ask for.
    #[serde(default)]
    pub emphasis: TestEmphasis,
    /// Test vocabulary searched across all ticket text.
    pub keywords: Vec<String>,
    /// Words that, together with "test", identify a test-plan section.
    pub plan_qualifiers: Vec<String>,
    /// Issue types that do not need test scenarios.
    #[serde(default)]
    pub exempt_types: Vec<String>,
}

struct TestScenarioDetector {
    emphasis: TestEmphasis,
    keywords: Vec<String>,
    plan_qualifiers: Vec<String>,
    exempt_types: Vec<String>,
}

impl TestScenarioDetector {
    fn new(config: &TestScenarioConfig) -> Self {
        Self {
            emphasis: config.emphasis,
            keywords: lowercase_all(&config.keywords),
            plan_qualifiers: lowercase_all(&config.plan_qualifiers),
            exempt_types: config.exempt_types.clone(),
        }
    }
}

impl Detector for TestScenarioDetector {
    fn id(&self) -> &'static str {
        "test-scenarios"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let all_lower = text.all_lower();
        let has_keywords = contains_any(all_lower, &self.keywords);
        let has_plan = all_lower.contains("test") && contains_any(all_lower, &self.plan_qualifiers);
        if has_keywords || has_plan || text.is_type_in(&self.exempt_types) {
            return Vec::new();
        }

        let gap = match self.emphasis {
            TestEmphasis::Scenarios => Gap::new(
                Category::Testing,
                Severity::Low,
                "No Test Scenarios",
                "No discussion of how to verify this works.",
            )
            .with_questions(&[
                "What is the happy path scenario?",
                "What edge cases need testing?",
                "What error conditions should be tested?",
                "What test data is needed?",
            ])
            .with_actions(&[
                "Document at least happy path + 2 edge cases",
                "Specify error handling requirements",
                "Note any special test data needs",
            ]),
            TestEmphasis::Validation => Gap::new(
                Category::Testing,
                Severity::Low,
                "No Validation Step",
                "No mention of how the change will be checked once applied.",
            )
            .with_questions(&["How do we confirm the change worked?"])
            .with_actions(&["Add one validation step (command, dashboard or check)"]),
        };
        vec![gap]
    }
}

/// Configuration for [`ScopeCreepDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeCreepConfig {
    /// Fewer comments than this are never flagged.
    pub min_comments: usize,
    /// Comments with additive language needed to flag scope growth.
    pub min_additive_comments: usize,
    /// Additive phrases ("also", "plus", ...).
    pub phrases: Vec<String>,
}

struct ScopeCreepDetector {
    min_comments: usize,
    min_additive_comments: usize,
    pattern: Regex,
}

impl ScopeCreepDetector {
    fn new(config: &ScopeCreepConfig) -> Result<Self> {
        Ok(Self {
            min_comments: config.min_comments,
            min_additive_comments: config.min_additive_comments,
            pattern: phrase_pattern("scope-creep", &config.phrases)?,
        })
    }
}

impl Detector for ScopeCreepDetector {
    fn id(&self) -> &'static str {
        "scope-creep"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let comments = text.comments();
        if comments.len() < self.min_comments {
            return Vec::new();
        }
        let additions = comments
            .iter()
            .filter(|comment| self.pattern.is_match(comment))
            .count();
        if additions < self.min_additive_comments {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Requirements,
                Severity::Medium,
                "Scope Growing in Comments",
                format!("Found {additions} comments adding requirements. May need splitting."),
            )
            .with_questions(&[
                "What is the current scope?",
                "Should this be split into multiple tickets?",
                "What is the minimum viable implementation?",
            ])
            .with_actions(&[
                "Review all comments for scope changes",
                "Update description to match current understanding",
                "Consider splitting into multiple tickets",
                "Get PO to confirm final scope",
            ]),
        ]
    }
}

/// Which security concern a [`SecurityContextDetector`] raises.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEmphasis {
    /// Sensitive data that needs a formal security review.
    Review,
    /// IAM or policy changes whose blast radius should be stated.
    Implications,
}

/// Configuration for [`SecurityContextDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityContextConfig {
    /// Which concern to raise.
    pub emphasis: SecurityEmphasis,
    /// Severity of the emitted gap.
    pub severity: Severity,
    /// Security-sensitive vocabulary.
    pub keywords: Vec<String>,
    /// Phrases that show security was already discussed.
    pub discussion_markers: Vec<String>,
    /// When set, only tickets with less text than this are flagged.
    #[serde(default)]
    pub max_text_len: Option<usize>,
}

struct SecurityContextDetector {
    emphasis: SecurityEmphasis,
    severity: Severity,
    keywords: Vec<String>,
    discussion_markers: Vec<String>,
    max_text_len: Option<usize>,
}

impl SecurityContextDetector {
    fn new(config: &SecurityContextConfig) -> Self {
        Self {
            emphasis: config.emphasis,
            severity: config.severity,
            keywords: lowercase_all(&config.keywords),
            discussion_markers: lowercase_all(&config.discussion_markers),
            max_text_len: config.max_text_len,
        }
    }
}

impl Detector for SecurityContextDetector {
    fn id(&self) -> &'static str {
        "security-context"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let all_lower = text.all_lower();
        if !contains_any(all_lower, &self.keywords) || contains_any(all_lower, &self.discussion_markers)
        {
            return Vec::new();
        }
        if let Some(limit) = self.max_text_len {
            if text.all_text_len() >= limit {
                return Vec::new();
            }
        }

        let gap = match self.emphasis {
            SecurityEmphasis::Review => Gap::new(
                Category::Context,
                self.severity,
                "Security Review Needed",
                "Ticket involves sensitive data but lacks security context.",
            )
            .with_questions(&[
                "What are the security requirements?",
                "Are there compliance considerations (GDPR, SOC2)?",
                "How is sensitive data protected?",
                "What audit logging is needed?",
            ])
            .with_actions(&[
                "Schedule security review",
                "Document security requirements",
                "Add security-specific acceptance criteria",
                "Flag for security team review",
            ]),
            SecurityEmphasis::Implications => Gap::new(
                Category::Context,
                self.severity,
                "Security Implications",
                "Involves IAM/policies but lacks security discussion.",
            )
            .with_questions(&[
                "What are the security implications?",
                "What permissions are being granted?",
            ])
            .with_actions(&["Add brief security context", "Note if security review needed"]),
        };
        vec![gap]
    }
}

/// Configuration for [`ProblemStatementDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemStatementConfig {
    /// Words that frame a problem or request.
    pub indicators: Vec<String>,
    /// Trimmed descriptions longer than this count as substantial.
    pub substantial_len: usize,
}

struct ProblemStatementDetector {
    indicators: Vec<String>,
    substantial_len: usize,
}

impl ProblemStatementDetector {
    fn new(config: &ProblemStatementConfig) -> Self {
        Self {
            indicators: lowercase_all(&config.indicators),
            substantial_len: config.substantial_len,
        }
    }
}

impl Detector for ProblemStatementDetector {
    fn id(&self) -> &'static str {
        "problem-statement"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let has_problem = contains_any(text.description_lower(), &self.indicators);
        let has_substance = text.description().trim().chars().count() > self.substantial_len;
        if has_problem || has_substance {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Requirements,
                Severity::High,
                "Missing Problem Statement",
                "No clear description of what needs to change or why.",
            )
            .with_questions(&["What problem are we solving?", "Who requested this?"])
            .with_actions(&[
                "Add context about what needs to change",
                "Link to Slack thread or related ticket",
            ]),
        ]
    }
}

/// Configuration for [`ReferenceDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Hosts whose links count as references (matched case-sensitively).
    pub hosts: Vec<String>,
    /// Descriptions at least this long are never flagged.
    pub min_description_len: usize,
}

struct ReferenceDetector {
    hosts: Vec<String>,
    min_description_len: usize,
}

impl ReferenceDetector {
    fn new(config: &ReferenceConfig) -> Self {
        Self {
            hosts: config.hosts.clone(),
            min_description_len: config.min_description_len,
        }
    }
}

impl Detector for ReferenceDetector {
    fn id(&self) -> &'static str {
        "references"
    }

    fn detect(&self, text: &TicketText) -> Vec<Gap> {
        let description = text.description();
        let has_reference = contains_any(description, &self.hosts) || has_issue_key(description);
        if has_reference || text.description_len() >= self.min_description_len {
            return Vec::new();
        }

        vec![
            Gap::new(
                Category::Context,
                Severity::Low,
                "No References",
                "Could benefit from links to code, Slack, or related tickets.",
            )
            .with_actions(&[
                "Add link to relevant GitHub repo/file",
                "Link to Slack discussion if applicable",
            ]),
        ]
    }
}

/// Run detectors in order and collect their gaps.
pub fn run_detectors(detectors: &[Box<dyn Detector + Send + Sync>], text: &TicketText) -> Vec<Gap> {
    let mut gaps = Vec::new();
    for detector in detectors {
        let found = detector.detect(text);
        debug!("detector {} reported {} gap(s)", detector.id(), found.len());
        gaps.extend(found);
    }
    gaps
}
