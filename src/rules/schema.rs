use regex::Regex;
use std::fmt;

/// One of the six recognized form sections.
///
/// `id` doubles as the `data-section` attribute value and the
/// `activeSection` comparison key; `heading` is the literal heading text
/// as it appears in the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub id: &'static str,
    pub heading: &'static str,
    pub layout: HeadingLayout,
}

/// How a section's heading is nested inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLayout {
    /// `<h3>` sits directly under the section container.
    Plain,
    /// `<h3>` shares a flex row with a sibling control; the row, not the
    /// heading, must receive the sticky styling so the control stays
    /// aligned while stuck.
    FlexRow,
}

/// Guarded insertion: splice `insert` directly after the first match of
/// `anchor`, unless `guard` is already present in the document.
#[derive(Debug, Clone)]
pub struct InsertRule {
    pub id: &'static str,
    pub description: &'static str,
    /// Substring whose presence means the insertion already happened.
    pub guard: &'static str,
    /// Anchor pattern; may match across line boundaries.
    pub anchor: Regex,
    /// Text spliced in immediately after the anchor match.
    pub insert: String,
}

/// Structural rewrite of one section's container and heading markup.
///
/// Unconditional in the sense that there is no separate guard condition:
/// idempotence comes from `marker`, the `data-section` attribute the
/// rewrite itself introduces.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub id: String,
    pub description: String,
    /// Marker substring that proves the rewrite already happened.
    pub marker: String,
    /// Shape of the untouched container/heading markup.
    pub pattern: Regex,
    pub section: Section,
}

/// One step of the transformation, applied in catalog order.
#[derive(Debug, Clone)]
pub enum Rule {
    Insert(InsertRule),
    Rewrite(RewriteRule),
}

impl Rule {
    pub fn id(&self) -> &str {
        match self {
            Rule::Insert(r) => r.id,
            Rule::Rewrite(r) => &r.id,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Rule::Insert(r) => r.description,
            Rule::Rewrite(r) => &r.description,
        }
    }

    /// The substring used to detect "already applied" state.
    pub fn guard_marker(&self) -> &str {
        match self {
            Rule::Insert(r) => r.guard,
            Rule::Rewrite(r) => &r.marker,
        }
    }
}

/// Validate a rule list before use.
pub fn validate_rules(rules: &[Rule]) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for rule in rules {
        if rule.id().trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                rule_id: None,
                field: "id",
            });
        }
        if !seen.insert(rule.id().to_string()) {
            issues.push(ValidationIssue::DuplicateId {
                rule_id: rule.id().to_string(),
            });
        }
        if rule.guard_marker().trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                rule_id: Some(rule.id().to_string()),
                field: "guard",
            });
        }

        match rule {
            Rule::Insert(r) => {
                if r.insert.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule_id: Some(r.id.to_string()),
                        field: "insert",
                    });
                }
                // An inserted block must contain its own guard, otherwise a
                // second run would splice it in again.
                if !r.insert.contains(r.guard) {
                    issues.push(ValidationIssue::GuardNotInPayload {
                        rule_id: r.id.to_string(),
                    });
                }
            }
            Rule::Rewrite(r) => {
                if r.section.heading.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule_id: Some(r.id.clone()),
                        field: "section.heading",
                    });
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    DuplicateId {
        rule_id: String,
    },
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    GuardNotInPayload {
        rule_id: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "duplicate rule id '{rule_id}'")
            }
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::GuardNotInPayload { rule_id } => {
                write!(
                    f,
                    "rule '{rule_id}': inserted text does not contain its guard marker"
                )
            }
        }
    }
}
