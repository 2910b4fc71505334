//! Shared fixture: a trimmed-down invoice form component carrying the
//! anchors and section markup the catalog targets.

#![allow(dead_code)]

pub const CONTAINER: &str =
    "space-y-4 p-5 bg-white/30 backdrop-blur-xl border border-white/30 rounded-2xl shadow-lg";

pub const HEADING: &str = "font-semibold text-lg text-gray-800";

pub fn plain_section(title: &str, field: &str) -> String {
    format!(
        r#"            <div className="{CONTAINER}">
              <h3 className="{HEADING}">{title}</h3>
              <input className="w-full" name="{field}" />
            </div>
"#
    )
}

pub fn flex_section(title: &str) -> String {
    format!(
        r#"            <div className="{CONTAINER}">
              <div className="flex justify-between items-center">
                <h3 className="{HEADING}">{title}</h3>
                <button type="button">+ Position</button>
              </div>
            </div>
"#
    )
}

const PREAMBLE: &str = r#"import React, { useState, useEffect } from 'react';

function App() {
  const [formData, setFormData] = useState({ lineItems: [], taxRate: 19 });
  const [uploadStatus, setUploadStatus] = useState(null);

  useEffect(() => {
    recalcTotals();
  }, [formData.lineItems, formData.taxRate];

  return (
    <div className="app">
      <main>
"#;

const EPILOGUE: &str = r#"      </main>
    </div>
  );
}

export default App;
"#;

/// The full fixture with all six sections in form order.
pub fn invoice_fixture() -> String {
    invoice_fixture_with(&[
        "Rechnungssteller",
        "Rechnungsempfänger",
        "Rechnungsdetails",
        "Rechnungspositionen",
        "Gesamtbeträge",
        "Zahlungsinformationen",
    ])
}

/// Fixture variant with custom heading texts (position 3 keeps the flex
/// row shape regardless of its heading).
pub fn invoice_fixture_with(headings: &[&str; 6]) -> String {
    let mut doc = String::from(PREAMBLE);
    for (idx, heading) in headings.iter().enumerate() {
        if idx == 3 {
            doc.push_str(&flex_section(heading));
        } else {
            doc.push_str(&plain_section(heading, &format!("field{idx}")));
        }
    }
    doc.push_str(EPILOGUE);
    doc
}

/// Fixture with filler lines between the section blocks.
pub fn invoice_fixture_with_filler(filler: &[String]) -> String {
    let sections = [
        plain_section("Rechnungssteller", "issuer"),
        plain_section("Rechnungsempfänger", "recipient"),
        plain_section("Rechnungsdetails", "details"),
        flex_section("Rechnungspositionen"),
        plain_section("Gesamtbeträge", "totals"),
        plain_section("Zahlungsinformationen", "payment"),
    ];

    let mut doc = String::from(PREAMBLE);
    for (idx, section) in sections.iter().enumerate() {
        if let Some(line) = filler.get(idx) {
            doc.push_str(&format!("            {{/* {line} */}}\n"));
        }
        doc.push_str(section);
    }
    doc.push_str(EPILOGUE);
    doc
}
