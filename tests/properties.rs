//! Property tests: idempotence and outside-span preservation under
//! randomized filler between the section blocks.

mod common;

use common::invoice_fixture_with_filler;
use proptest::prelude::*;
use sticky_patcher::{apply_rules, rules, RuleResult, SourceDocument};

proptest! {
    #[test]
    fn applying_twice_equals_applying_once(
        filler in proptest::collection::vec("[a-z ]{0,40}", 0..6)
    ) {
        let fixture = invoice_fixture_with_filler(&filler);

        let mut first = SourceDocument::from_string("App.js", &fixture);
        let results = apply_rules(&mut first, &rules());
        for (id, result) in &results {
            prop_assert!(
                matches!(result, Ok(RuleResult::Applied)),
                "rule {} did not apply", id
            );
        }
        let once = first.content().to_string();

        let mut second = SourceDocument::from_string("App.js", &once);
        let results = apply_rules(&mut second, &rules());
        prop_assert_eq!(second.content(), once.as_str());
        for (id, result) in &results {
            prop_assert!(
                matches!(result, Ok(RuleResult::AlreadyApplied)),
                "rule {} reapplied", id
            );
        }
    }

    #[test]
    fn filler_outside_matched_spans_is_preserved(
        filler in proptest::collection::vec("[a-z]{1,20}", 6)
    ) {
        let fixture = invoice_fixture_with_filler(&filler);

        let mut doc = SourceDocument::from_string("App.js", &fixture);
        apply_rules(&mut doc, &rules());

        for line in &filler {
            let comment = format!("{{/* {} */}}", line);
            prop_assert!(
                doc.content().contains(&comment),
                "filler line {:?} was clobbered", line
            );
        }
    }
}
