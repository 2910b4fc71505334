//! The fixed transformation catalog.
//!
//! Two guarded inserts (component state, observer effect) followed by six
//! section rewrites, in the order the sections appear in the form. All
//! literal markup fragments the rules match against live here.

use regex::{Captures, Regex};

use crate::rules::schema::{HeadingLayout, InsertRule, RewriteRule, Rule, Section};

/// The six recognized sections of the invoice form, in document order.
pub const SECTIONS: [Section; 6] = [
    Section {
        id: "rechnungssteller",
        heading: "Rechnungssteller",
        layout: HeadingLayout::Plain,
    },
    Section {
        id: "rechnungsempfaenger",
        heading: "Rechnungsempfänger",
        layout: HeadingLayout::Plain,
    },
    Section {
        id: "rechnungsdetails",
        heading: "Rechnungsdetails",
        layout: HeadingLayout::Plain,
    },
    Section {
        id: "rechnungspositionen",
        heading: "Rechnungspositionen",
        layout: HeadingLayout::FlexRow,
    },
    Section {
        id: "gesamtbetraege",
        heading: "Gesamtbeträge",
        layout: HeadingLayout::Plain,
    },
    Section {
        id: "zahlungsinformationen",
        heading: "Zahlungsinformationen",
        layout: HeadingLayout::Plain,
    },
];

/// Class string on every section container.
const CONTAINER_CLASSES: &str =
    "space-y-4 p-5 bg-white/30 backdrop-blur-xl border border-white/30 rounded-2xl shadow-lg";

/// Class string on an untouched section heading.
const HEADING_CLASSES: &str = "font-semibold text-lg text-gray-800";

/// Class string on the flex row wrapping the Rechnungspositionen heading.
const FLEX_ROW_CLASSES: &str = "flex justify-between items-center";

/// Classes switched on while a section's heading is stuck.
const STICKY_CLASSES: &str =
    "sticky top-20 z-20 bg-white/95 backdrop-blur-sm py-2 -mx-5 px-5 shadow-sm";

const TRANSITION_CLASSES: &str = "transition-all duration-200";

const STATE_GUARD: &str = "activeSection";
const STATE_ANCHOR: &str = r"(?s)const \[uploadStatus, setUploadStatus\] = useState\(null\);.*?\n";
const STATE_INSERT: &str = "  const [activeSection, setActiveSection] = useState('');\n";

const EFFECT_GUARD: &str = "Intersection Observer für Sticky Headers";
const EFFECT_ANCHOR: &str = r"  \}, \[formData\.lineItems, formData\.taxRate\];\n";

/// Build the full, ordered rule list.
pub fn rules() -> Vec<Rule> {
    let mut rules = Vec::with_capacity(SECTIONS.len() + 2);
    rules.push(Rule::Insert(state_rule()));
    rules.push(Rule::Insert(observer_rule()));
    for section in &SECTIONS {
        rules.push(Rule::Rewrite(rewrite_rule(section)));
    }
    rules
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static rule pattern must compile")
}

fn state_rule() -> InsertRule {
    InsertRule {
        id: "active-section-state",
        description: "declare activeSection state after the uploadStatus declaration",
        guard: STATE_GUARD,
        anchor: compile(STATE_ANCHOR),
        insert: STATE_INSERT.to_string(),
    }
}

fn observer_rule() -> InsertRule {
    InsertRule {
        id: "intersection-observer",
        description: "install the IntersectionObserver effect after the line-items effect",
        guard: EFFECT_GUARD,
        anchor: compile(EFFECT_ANCHOR),
        insert: observer_effect(),
    }
}

/// The effect block spliced in after the line-items effect. The section
/// list is generated from [`SECTIONS`] so the observer and the rewrites
/// can never disagree about the ids.
fn observer_effect() -> String {
    let section_config = SECTIONS
        .iter()
        .map(|s| format!("      {{ id: '{}' }}", s.id))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"
  // Intersection Observer für Sticky Headers
  useEffect(() => {{
    const observers = [];

    const sectionConfig = [
{section_config}
    ];

    sectionConfig.forEach(section => {{
      const sectionElement = document.querySelector(`[data-section="${{section.id}}"]`);
      if (sectionElement) {{
        const observer = new IntersectionObserver(
          ([entry]) => {{
            if (entry.isIntersecting && entry.intersectionRatio > 0.3) {{
              setActiveSection(section.id);
            }} else if (!entry.isIntersecting && activeSection === section.id) {{
              setActiveSection('');
            }}
          }},
          {{
            threshold: [0, 0.3, 0.7],
            rootMargin: '-80px 0px -50% 0px'
          }}
        );

        observer.observe(sectionElement);
        observers.push(observer);
      }}
    }});

    return () => observers.forEach(observer => observer.disconnect());
  }}, [activeSection]);

"#
    )
}

fn rewrite_rule(section: &Section) -> RewriteRule {
    let pattern = match section.layout {
        HeadingLayout::Plain => plain_pattern(section.heading),
        HeadingLayout::FlexRow => flex_row_pattern(section.heading),
    };

    RewriteRule {
        id: format!("section-{}", section.id),
        description: format!(
            "attach data-section and sticky heading styling to '{}'",
            section.heading
        ),
        marker: format!("data-section=\"{}\"", section.id),
        pattern: compile(&pattern),
        section: *section,
    }
}

/// Container followed directly by its heading.
fn plain_pattern(heading: &str) -> String {
    format!(
        r#"<div className="{container}">(?P<ws>\s*)<h3 className="{h3}">{title}</h3>"#,
        container = regex::escape(CONTAINER_CLASSES),
        h3 = regex::escape(HEADING_CLASSES),
        title = regex::escape(heading),
    )
}

/// Container whose heading shares a flex row with a sibling control.
fn flex_row_pattern(heading: &str) -> String {
    format!(
        r#"<div className="{container}">(?P<ws1>\s*)<div className="{flex}">(?P<ws2>\s*)<h3 className="{h3}">{title}</h3>"#,
        container = regex::escape(CONTAINER_CLASSES),
        flex = regex::escape(FLEX_ROW_CLASSES),
        h3 = regex::escape(HEADING_CLASSES),
        title = regex::escape(heading),
    )
}

/// Render the rewritten markup for one section, preserving the captured
/// inter-tag whitespace so everything outside the matched span survives
/// byte-for-byte.
pub fn render_replacement(section: &Section, caps: &Captures) -> String {
    match section.layout {
        HeadingLayout::Plain => format!(
            "<div className=\"{container}\" data-section=\"{id}\">{ws}\
             <h3 className={{`{h3} {transition} ${{activeSection === '{id}' ? '{sticky}' : ''}}`}}>{title}</h3>",
            container = CONTAINER_CLASSES,
            id = section.id,
            ws = &caps["ws"],
            h3 = HEADING_CLASSES,
            transition = TRANSITION_CLASSES,
            sticky = STICKY_CLASSES,
            title = section.heading,
        ),
        HeadingLayout::FlexRow => format!(
            "<div className=\"{container}\" data-section=\"{id}\">{ws1}\
             <div className={{`{flex} {transition} ${{activeSection === '{id}' ? '{sticky}' : ''}}`}}>{ws2}\
             <h3 className=\"{h3}\">{title}</h3>",
            container = CONTAINER_CLASSES,
            id = section.id,
            ws1 = &caps["ws1"],
            ws2 = &caps["ws2"],
            flex = FLEX_ROW_CLASSES,
            transition = TRANSITION_CLASSES,
            sticky = STICKY_CLASSES,
            h3 = HEADING_CLASSES,
            title = section.heading,
        ),
    }
}
