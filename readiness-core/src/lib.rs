#![deny(missing_docs)]
//! Ticket readiness core library.
//!
//! This crate scores issue-tracker tickets for estimation readiness: it
//! detects gaps in a ticket's text, scores them per category under a named
//! profile, and renders the resulting report. It also builds the grooming
//! and blocked-ticket searches and triages blocked tickets.

pub mod analyzer;
pub mod blocked;
pub mod detector;
/// Built-in detectors and the detector registry.
pub mod detectors;
pub mod domain;
pub mod error;
pub mod grooming;
pub mod profiles;
pub mod report;
pub mod scoring;
pub mod signal;
pub mod text;

pub use analyzer::Analyzer;
pub use blocked::{BlockedQuery, BlockedTicket, DatedComment, render_blocked};
pub use detector::Detector;
pub use detectors::{DetectorSpec, build_detectors, run_detectors};
pub use domain::{Category, Gap, IssueLink, Severity, Ticket};
pub use error::{ReadinessError, Result};
pub use grooming::{Candidate, GroomingQuery, format_age, render_candidates};
pub use profiles::{FSEC_PROFILE, STANDARD_PROFILE, ScoringProfile};
pub use report::{ReadinessReport, ReadinessTier, render_json, render_text, render_text_batch};
pub use scoring::{CategoryPolicy, CategoryScore, DeductionTable, Strategy};
pub use signal::{Signal, StrengthCheck};
pub use text::TicketText;
