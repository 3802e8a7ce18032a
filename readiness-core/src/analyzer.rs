//! Readiness analysis orchestration.

use log::info;

use crate::detector::Detector;
use crate::detectors::{build_detectors, run_detectors};
use crate::domain::{Category, Ticket};
use crate::error::Result;
use crate::profiles::ScoringProfile;
use crate::report::ReadinessReport;
use crate::scoring::score_categories;
use crate::signal::collect_strengths;
use crate::text::TicketText;

/// Scores tickets against one immutable profile.
///
/// An analyzer holds no per-ticket state and can be shared across tasks.
pub struct Analyzer {
    profile: ScoringProfile,
    detectors: Vec<Box<dyn Detector + Send + Sync>>,
}

impl Analyzer {
    /// Build an analyzer and its detectors from a profile.
    pub fn new(profile: ScoringProfile) -> Result<Self> {
        profile.validate()?;
        let detectors = build_detectors(&profile.detectors)?;
        Ok(Self {
            profile,
            detectors,
        })
    }

    /// Build an analyzer with an explicit detector list, ignoring the
    /// profile's own detector configuration.
    pub fn with_detectors(
        profile: ScoringProfile,
        detectors: Vec<Box<dyn Detector + Send + Sync>>,
    ) -> Self {
        Self {
            profile,
            detectors,
        }
    }

    /// Profile in use.
    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Analyze one ticket snapshot.
    pub fn analyze(&self, ticket: &Ticket) -> ReadinessReport {
        let text = TicketText::from_ticket(ticket);
        let gaps = run_detectors(&self.detectors, &text);
        let strengths = collect_strengths(&self.profile.strengths, &text);
        let category_scores = score_categories(&self.profile.categories, &gaps, &text);

        let total_score = category_scores
            .iter()
            .map(|score| score.score)
            .fold(0, u32::saturating_add);
        let requirements = category_scores
            .iter()
            .find(|score| score.category == Category::Requirements)
            .map(|score| score.score)
            .unwrap_or_default();
        let ready_for_estimation = self.profile.is_ready(total_score, requirements);

        info!(
            "{} scored {total_score}/100 under {} ({} gap(s), ready: {ready_for_estimation})",
            ticket.key,
            self.profile.name,
            gaps.len()
        );

        ReadinessReport {
            issue_key: ticket.key.clone(),
            summary: ticket.summary.clone(),
            issue_type: ticket.issue_type.clone(),
            status: ticket.status.clone(),
            profile: self.profile.name.clone(),
            category_scores,
            total_score,
            gaps,
            strengths,
            ready_for_estimation,
            estimated: ticket.is_estimated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::MockDetector;
    use crate::domain::{Gap, IssueLink, Severity};
    use crate::scoring::{DeductionTable, Strategy};
    use mockall::Sequence;

    fn ticket(issue_type: &str, description: &str) -> Ticket {
        Ticket {
            key: "OPS-42".to_string(),
            summary: "Rotate credentials".to_string(),
            description: description.to_string(),
            issue_type: issue_type.to_string(),
            status: "Backlog".to_string(),
            ..Ticket::default()
        }
    }

    fn standard() -> Analyzer {
        Analyzer::new(ScoringProfile::standard()).expect("standard analyzer")
    }

    fn fsec() -> Analyzer {
        Analyzer::new(ScoringProfile::fsec()).expect("fsec analyzer")
    }

    #[test]
    fn empty_story_under_standard_misses_acceptance_criteria() {
        let report = standard().analyze(&Ticket {
            issue_type: "Story".to_string(),
            ..Ticket::default()
        });
        assert_eq!(report.gaps[0].title, "Missing Acceptance Criteria");
        assert_eq!(report.gaps[0].severity, Severity::High);
        assert_eq!(report.score(Category::Requirements), Some(45));
        assert_eq!(report.score(Category::Technical), Some(12));
        assert_eq!(report.score(Category::Testing), Some(0));
        assert_eq!(report.score(Category::Context), Some(5));
        assert_eq!(report.total_score, 62);
        assert!(!report.ready_for_estimation);
    }

    #[test]
    fn empty_task_under_fsec_sits_on_the_floor() {
        let report = fsec().analyze(&Ticket {
            issue_type: "Task".to_string(),
            ..Ticket::default()
        });
        assert_eq!(report.gaps[0].title, "Missing Problem Statement");
        assert_eq!(report.score(Category::Requirements), Some(25));
        assert_eq!(report.score(Category::Technical), Some(0));
        assert_eq!(report.score(Category::Context), Some(13));
        assert_eq!(report.score(Category::Testing), Some(3));
        assert_eq!(report.total_score, 41);
        assert!(!report.ready_for_estimation);
    }

    #[test]
    fn unresolved_marker_costs_a_high_deduction() {
        let description = "Acceptance criteria:\n- [ ] rotate the api token in the service\n\
                           Test plan: verify the old token is rejected. Owner TBD";
        let report = standard().analyze(&ticket("Story", description));
        let ambiguity = report
            .gaps
            .iter()
            .find(|gap| gap.title == "Vague or Ambiguous Requirements")
            .expect("ambiguity gap");
        assert_eq!(ambiguity.severity, Severity::High);
        assert_eq!(report.score(Category::Requirements), Some(45));

        let report = fsec().analyze(&ticket("Task", description));
        assert!(
            report
                .gaps
                .iter()
                .any(|gap| gap.severity == Severity::High && gap.title.contains("Ambigu"))
        );
        assert_eq!(report.score(Category::Requirements), Some(25));
    }

    #[test]
    fn well_groomed_story_is_ready() {
        let description = "As an operator I need the api token rotated.\n\
                           Acceptance criteria:\n\
                           - [ ] new token issued by the auth service\n\
                           - [ ] old token rejected\n\
                           Test scenarios: happy path and expired token edge case.\n\
                           Security review requested from compliance.";
        let mut story = ticket("Story", description);
        story.links.push(IssueLink {
            relationship: "blocks".to_string(),
            key: "OPS-7".to_string(),
            status: "Done".to_string(),
        });
        story.estimate = Some(3.0);

        let report = standard().analyze(&story);
        assert!(report.gaps.is_empty(), "unexpected gaps: {:?}", report.gaps);
        assert_eq!(report.total_score, 100);
        assert!(report.ready_for_estimation);
        assert!(report.estimated);
        assert!(report.strengths.contains(&"Has acceptance criteria".to_string()));
        assert!(report.strengths.contains(&"Dependencies linked".to_string()));
    }

    #[test]
    fn security_keywords_without_discussion_are_flagged() {
        let report = standard().analyze(&ticket("Story", "Store the password hash. AC: login works"));
        assert!(
            report
                .gaps
                .iter()
                .any(|gap| gap.category == Category::Context && gap.severity == Severity::High)
        );

        let report = standard().analyze(&ticket("Story", "Rename the button. AC: label changes"));
        assert!(report.gaps.iter().all(|gap| gap.category != Category::Context));
    }

    #[test]
    fn verdict_matches_threshold_and_floor_exactly() {
        for description in [
            "",
            "TBD",
            "Need to deploy the lambda into the shared account, see OPS-3 and verify",
            "Acceptance criteria: api returns 200. Test the happy path.",
        ] {
            for analyzer in [standard(), fsec()] {
                let report = analyzer.analyze(&ticket("Task", description));
                let requirements = report.score(Category::Requirements).expect("requirements");
                let profile = analyzer.profile();
                assert_eq!(
                    report.ready_for_estimation,
                    report.total_score >= profile.ready_threshold
                        && requirements >= profile.requirements_floor
                );
                let sum: u32 = report.category_scores.iter().map(|s| s.score).sum();
                assert_eq!(sum, report.total_score);
                assert!(report.total_score <= 100);
                for score in &report.category_scores {
                    assert!(score.score <= score.max);
                }
            }
        }
    }

    #[test]
    fn analysis_is_deterministic() {
        let analyzer = fsec();
        let task = ticket("Task", "Currently the s3 bucket policy is broken. Update it.");
        let first = analyzer.analyze(&task);
        let second = analyzer.analyze(&task);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("json"),
            serde_json::to_string(&second).expect("json")
        );
    }

    #[test]
    fn gaps_keep_detector_order() {
        let mut seq = Sequence::new();
        let mut first = MockDetector::new();
        first.expect_id().return_const("first");
        first
            .expect_detect()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                vec![Gap::new(Category::Testing, Severity::Low, "later category", "x")]
            });
        let mut second = MockDetector::new();
        second.expect_id().return_const("second");
        second
            .expect_detect()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                vec![Gap::new(Category::Requirements, Severity::High, "earlier category", "y")]
            });

        let analyzer = Analyzer::with_detectors(
            ScoringProfile::standard(),
            vec![Box::new(first), Box::new(second)],
        );
        let report = analyzer.analyze(&ticket("Story", ""));
        let titles: Vec<_> = report.gaps.iter().map(|gap| gap.title.as_str()).collect();
        assert_eq!(titles, vec!["later category", "earlier category"]);
        assert_eq!(report.score(Category::Requirements), Some(45));
        assert_eq!(report.score(Category::Testing), Some(0));
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let mut profile = ScoringProfile::standard();
        profile.ready_threshold = 101;
        assert!(Analyzer::new(profile).is_err());
    }

    #[test]
    fn oversized_deduction_never_panics_during_analysis() {
        let mut profile = ScoringProfile::standard();
        profile.categories[0].strategy = Strategy::Deductive {
            deductions: DeductionTable::new(u32::MAX, 0, 0),
        };
        assert!(Analyzer::new(profile.clone()).is_err());

        let detectors = build_detectors(&profile.detectors).expect("detectors");
        let analyzer = Analyzer::with_detectors(profile, detectors);
        let report = analyzer.analyze(&ticket("Story", "Owner TBD"));
        assert_eq!(report.score(Category::Requirements), Some(0));
        assert!(report.total_score <= 100);
    }
}
