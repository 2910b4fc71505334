pub mod applicator;
pub mod catalog;
pub mod schema;

pub use applicator::{apply_rules, check_rules, ApplyError, RuleResult};
pub use catalog::{rules, SECTIONS};
pub use schema::{
    validate_rules, HeadingLayout, InsertRule, RewriteRule, Rule, Section, ValidationError,
    ValidationIssue,
};
