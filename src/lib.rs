//! Sticky Patcher: retrofits sticky section headers into the invoice form UI
//!
//! A one-shot source patcher for the form component (`src/App.js`): it
//! declares an `activeSection` state, installs an IntersectionObserver
//! effect, and tags each of the six form sections with a `data-section`
//! attribute plus conditional sticky styling on its heading.
//!
//! # Architecture
//!
//! All rules compile down to a single primitive: [`Edit`], a verified
//! byte-span replacement against the in-memory [`SourceDocument`].
//! Intelligence lives in span acquisition (anchor and shape patterns in
//! the [`rules::catalog`]), not in the application logic.
//!
//! # Safety
//!
//! - All edits verify expected before-text before applying
//! - Atomic file write-back (tempfile + fsync + rename)
//! - Project boundary enforcement
//! - UTF-8 validation
//! - Idempotent rules: guard markers make a second run a no-op
//!
//! # Reporting
//!
//! A rule whose pattern does not match is never silently dropped: it is
//! reported as skipped, with a fuzzy nearest-heading hint for section
//! rewrites, and drives a non-zero exit from the CLI.
//!
//! # Example
//!
//! ```no_run
//! use sticky_patcher::{apply_rules, rules, RuleResult, SourceDocument};
//!
//! let mut doc = SourceDocument::load("src/App.js").expect("readable target");
//! for (id, result) in apply_rules(&mut doc, &rules()) {
//!     match result {
//!         Ok(outcome) => println!("{id}: {outcome}"),
//!         Err(e) => eprintln!("{id}: {e}"),
//!     }
//! }
//! doc.save().expect("writable target");
//! ```

pub mod document;
pub mod edit;
pub mod rules;
pub mod safety;

// Re-exports
pub use document::{DocumentError, SourceDocument};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use rules::{
    apply_rules, check_rules, rules, validate_rules, ApplyError, HeadingLayout, Rule, RuleResult,
    Section, ValidationError, SECTIONS,
};
pub use safety::{ProjectGuard, SafetyError};
