//! Detector trait definitions.

use crate::domain::Gap;
use crate::text::TicketText;

/// A readiness check that inspects ticket text and reports gaps.
#[cfg_attr(test, mockall::automock)]
pub trait Detector {
    /// Returns the unique ID of the detector (e.g., "acceptance-criteria").
    fn id(&self) -> &'static str;
    /// Inspects the ticket and returns zero or more gaps.
    fn detect(&self, text: &TicketText) -> Vec<Gap>;
}
