//! Rule applicator - runs the catalog against a document, in order.
//!
//! Each rule yields an explicit result. A pattern that does not match is
//! reported as `Skipped` with a reason (never silently dropped), and a
//! pattern matching more than once is an error rather than a blind
//! first-match rewrite.

use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::document::SourceDocument;
use crate::edit::{Edit, EditError, EditResult};
use crate::rules::catalog;
use crate::rules::schema::{InsertRule, RewriteRule, Rule};

/// Result of applying a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RuleResult should be checked for success/skip"]
pub enum RuleResult {
    /// Rule matched and the document was changed
    Applied,
    /// The rule's guard marker is already present; nothing to do
    AlreadyApplied,
    /// The anchor or section shape did not match; document left untouched
    Skipped { reason: String },
}

impl fmt::Display for RuleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleResult::Applied => write!(f, "Applied"),
            RuleResult::AlreadyApplied => write!(f, "Already applied"),
            RuleResult::Skipped { reason } => write!(f, "Skipped: {}", reason),
        }
    }
}

/// Errors during rule application.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    #[error("pattern matched {count} locations (expected 1)")]
    AmbiguousMatch { count: usize },
}

/// Apply the rule list to the in-memory document, in order.
///
/// Returns one `(rule_id, result)` pair per rule. The document is mutated
/// for every rule that applies; persisting is the caller's decision.
pub fn apply_rules(
    doc: &mut SourceDocument,
    rules: &[Rule],
) -> Vec<(String, Result<RuleResult, ApplyError>)> {
    rules
        .iter()
        .map(|rule| (rule.id().to_string(), apply_rule(doc, rule)))
        .collect()
}

/// Evaluate the rule list without mutating the caller's document.
///
/// Mirrors `apply_rules` result semantics (`Applied` means "would apply")
/// by running against a scratch copy.
pub fn check_rules(
    doc: &SourceDocument,
    rules: &[Rule],
) -> Vec<(String, Result<RuleResult, ApplyError>)> {
    let mut scratch = doc.clone();
    apply_rules(&mut scratch, rules)
}

fn apply_rule(doc: &mut SourceDocument, rule: &Rule) -> Result<RuleResult, ApplyError> {
    match rule {
        Rule::Insert(rule) => apply_insert(doc, rule),
        Rule::Rewrite(rule) => apply_rewrite(doc, rule),
    }
}

fn apply_insert(doc: &mut SourceDocument, rule: &InsertRule) -> Result<RuleResult, ApplyError> {
    if doc.content().contains(rule.guard) {
        return Ok(RuleResult::AlreadyApplied);
    }

    // First anchor match wins; the anchors are declaration/effect tails
    // that occur once in the component.
    let at = match rule.anchor.find(doc.content()) {
        Some(m) => m.end(),
        None => {
            return Ok(RuleResult::Skipped {
                reason: format!("anchor not found: cannot {}", rule.description),
            });
        }
    };

    let edit = Edit::insert_at(at, rule.insert.clone());
    match doc.apply(&edit)? {
        EditResult::Applied { .. } => Ok(RuleResult::Applied),
        EditResult::AlreadyApplied => Ok(RuleResult::AlreadyApplied),
    }
}

fn apply_rewrite(doc: &mut SourceDocument, rule: &RewriteRule) -> Result<RuleResult, ApplyError> {
    if doc.content().contains(&rule.marker) {
        return Ok(RuleResult::AlreadyApplied);
    }

    let edit = {
        let content = doc.content();
        let mut caps_iter = rule.pattern.captures_iter(content);

        let Some(caps) = caps_iter.next() else {
            let reason = match nearest_heading(content, rule.section.heading) {
                Some(found) => format!(
                    "section shape for '{}' not found (closest heading in document: '{}')",
                    rule.section.heading, found
                ),
                None => format!("section shape for '{}' not found", rule.section.heading),
            };
            return Ok(RuleResult::Skipped { reason });
        };

        if caps_iter.next().is_some() {
            return Err(ApplyError::AmbiguousMatch {
                count: rule.pattern.find_iter(content).count(),
            });
        }

        let m = caps.get(0).expect("group 0 is the whole match");
        Edit::replace(
            m.start(),
            m.end(),
            catalog::render_replacement(&rule.section, &caps),
            m.as_str(),
        )
    };

    match doc.apply(&edit)? {
        EditResult::Applied { .. } => Ok(RuleResult::Applied),
        EditResult::AlreadyApplied => Ok(RuleResult::AlreadyApplied),
    }
}

/// Fuzzy-scan the document's `<h3>` headings for the one closest to
/// `expected`, so a skip reason can point at a renamed or mistyped heading.
fn nearest_heading(content: &str, expected: &str) -> Option<String> {
    let heading = Regex::new(r"<h3[^>]*>([^<{]+)</h3>").expect("static pattern must compile");

    let mut best: Option<(f64, String)> = None;
    for caps in heading.captures_iter(content) {
        let text = caps[1].trim().to_string();
        if text.is_empty() {
            continue;
        }
        let score = strsim::normalized_levenshtein(expected, &text);
        if best.as_ref().map_or(true, |(b, _)| score > *b) {
            best = Some((score, text));
        }
    }

    best.filter(|(score, _)| *score >= 0.5).map(|(_, text)| text)
}
