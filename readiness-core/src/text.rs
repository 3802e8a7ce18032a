//! Normalized ticket text shared by detectors, signals and scoring.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Ticket;

/// Characters of context kept on each side of an excerpt match.
pub const EXCERPT_CONTEXT_CHARS: usize = 50;

static ISSUE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]+-\d+\b").expect("issue key pattern"));

/// Read-only, pre-normalized view of one ticket.
///
/// Absent description or comments are empty strings, never errors. Lowercased
/// copies are computed once so detectors do not repeat the work.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketText {
    description: String,
    description_lower: String,
    comments: Vec<String>,
    all_text: String,
    all_lower: String,
    issue_type: String,
    link_count: usize,
}

impl TicketText {
    /// Normalize a ticket snapshot.
    pub fn from_ticket(ticket: &Ticket) -> Self {
        let mut all_text = format!("{}\n{}\n", ticket.summary, ticket.description);
        all_text.push_str(&ticket.comments.join("\n"));
        Self {
            description: ticket.description.clone(),
            description_lower: ticket.description.to_lowercase(),
            comments: ticket.comments.clone(),
            all_lower: all_text.to_lowercase(),
            all_text,
            issue_type: ticket.issue_type.trim().to_lowercase(),
            link_count: ticket.links.len(),
        }
    }

    /// Raw description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lowercased description.
    pub fn description_lower(&self) -> &str {
        &self.description_lower
    }

    /// Description length in characters.
    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }

    /// Comment bodies, oldest first.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Summary, description and comments joined by newlines.
    pub fn all_text(&self) -> &str {
        &self.all_text
    }

    /// Lowercased [`TicketText::all_text`].
    pub fn all_lower(&self) -> &str {
        &self.all_lower
    }

    /// Length of [`TicketText::all_text`] in characters.
    pub fn all_text_len(&self) -> usize {
        self.all_text.chars().count()
    }

    /// Lowercased, trimmed issue type.
    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    /// Whether the issue type is one of `types` (compared case-insensitively).
    pub fn is_type_in(&self, types: &[String]) -> bool {
        types
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(&self.issue_type))
    }

    /// Number of linked issues.
    pub fn link_count(&self) -> usize {
        self.link_count
    }
}

/// Whether `haystack` contains any of `needles`. Callers pass lowercased
/// haystacks for keyword lists, which are lowercased at construction.
pub fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

/// Whether the text references a tracker key such as `OPS-42`.
pub fn has_issue_key(text: &str) -> bool {
    ISSUE_KEY.is_match(text)
}

/// Lowercase every entry of a keyword list.
pub fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|word| word.to_lowercase()).collect()
}

/// Case-insensitive matcher that returns a term with its surrounding line
/// context.
#[derive(Debug, Clone)]
pub struct ExcerptFinder {
    term: String,
    pattern: Regex,
}

impl ExcerptFinder {
    /// Build a finder for one literal term.
    pub fn new(term: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            "(?i).{{0,{n}}}{}.{{0,{n}}}",
            regex::escape(term),
            n = EXCERPT_CONTEXT_CHARS
        ))?;
        Ok(Self {
            term: term.to_string(),
            pattern,
        })
    }

    /// The literal term this finder matches.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// First excerpt around the term, trimmed, if any.
    pub fn first_excerpt(&self, text: &str) -> Option<String> {
        self.pattern
            .find(text)
            .map(|found| found.as_str().trim().to_string())
    }
}

/// Keep at most `limit` excerpts, dropping any whose lowercase form is already
/// contained in a kept excerpt.
pub fn dedup_excerpts(excerpts: Vec<String>, limit: usize) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for excerpt in excerpts {
        if kept.len() >= limit {
            break;
        }
        let lower = excerpt.to_lowercase();
        if kept.iter().any(|existing| existing.to_lowercase().contains(&lower)) {
            continue;
        }
        kept.push(excerpt);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IssueLink;

    fn ticket() -> Ticket {
        Ticket {
            key: "OPS-1".to_string(),
            summary: "Rotate KMS keys".to_string(),
            description: "Rotate the keys".to_string(),
            issue_type: " Story ".to_string(),
            comments: vec!["first".to_string(), "second".to_string()],
            links: vec![IssueLink::default()],
            ..Ticket::default()
        }
    }

    #[test]
    fn all_text_joins_summary_description_and_comments() {
        let text = TicketText::from_ticket(&ticket());
        assert_eq!(text.all_text(), "Rotate KMS keys\nRotate the keys\nfirst\nsecond");
        assert!(text.all_lower().contains("rotate kms keys"));
        assert_eq!(text.issue_type(), "story");
        assert_eq!(text.link_count(), 1);
    }

    #[test]
    fn empty_ticket_normalizes_to_empty_text() {
        let text = TicketText::from_ticket(&Ticket::default());
        assert_eq!(text.all_text(), "\n\n");
        assert_eq!(text.description_len(), 0);
        assert!(text.comments().is_empty());
    }

    #[test]
    fn type_membership_ignores_case() {
        let text = TicketText::from_ticket(&ticket());
        assert!(text.is_type_in(&["STORY".to_string()]));
        assert!(!text.is_type_in(&["bug".to_string()]));
    }

    #[test]
    fn issue_keys_require_uppercase_project() {
        assert!(has_issue_key("see OPS-42 for context"));
        assert!(!has_issue_key("see ops-42 for context"));
        assert!(!has_issue_key("no references here"));
    }

    #[test]
    fn excerpt_keeps_line_context() {
        let finder = ExcerptFinder::new("TBD").expect("finder");
        let excerpt = finder
            .first_excerpt("Intro line\n  Owner is tbd for now  \nlast")
            .expect("excerpt");
        assert_eq!(excerpt, "Owner is tbd for now");
    }

    #[test]
    fn excerpt_truncates_long_context() {
        let finder = ExcerptFinder::new("maybe").expect("finder");
        let text = format!("{}maybe{}", "a".repeat(80), "b".repeat(80));
        let excerpt = finder.first_excerpt(&text).expect("excerpt");
        assert_eq!(excerpt.chars().count(), 50 + 5 + 50);
    }

    #[test]
    fn dedup_drops_contained_excerpts_and_truncates() {
        let kept = dedup_excerpts(
            vec![
                "We might use S3".to_string(),
                "might use".to_string(),
                "maybe later".to_string(),
                "probably".to_string(),
            ],
            2,
        );
        assert_eq!(kept, vec!["We might use S3".to_string(), "maybe later".to_string()]);
    }
}
