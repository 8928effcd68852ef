//! Document assembly.
//!
//! A `Document` is built as an ordered list of section records and serialized
//! once. The table of contents is derived from the records, so it always lists
//! exactly the optional sections that are present.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::fields::ValidFields;
use crate::sections::{self, BULLET, Section, SectionKind};

/// Separator between sections: one blank line.
const SECTION_SEPARATOR: &str = "\n\n";

static NON_WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]+").expect("static regex is valid"));

/// Fragment identifier for a heading: lower-cased, each run of non-word
/// characters replaced by a single hyphen.
pub fn anchor(heading: &str) -> String {
    NON_WORD_RUN
        .replace_all(&heading.to_lowercase(), "-")
        .into_owned()
}

/// A table of contents link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: &'static str,
    pub anchor: String,
}

/// An assembled README, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|s| s.kind == kind)
    }

    /// Table of contents entries, in document order.
    pub fn toc_entries(&self) -> Vec<TocEntry> {
        toc_entries(&self.sections)
    }

    /// Serializes the document to Markdown, ending with a single newline.
    pub fn render(&self) -> String {
        let mut out = self
            .sections
            .iter()
            .map(Section::render)
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR);
        out.push('\n');
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn toc_entries(sections: &[Section]) -> Vec<TocEntry> {
    sections
        .iter()
        .filter(|s| s.kind.is_optional())
        .filter_map(|s| s.kind.heading())
        .map(|title| TocEntry {
            title,
            anchor: anchor(title),
        })
        .collect()
}

fn table_of_contents(entries: &[TocEntry]) -> Option<Section> {
    if entries.is_empty() {
        return None;
    }
    let body = entries
        .iter()
        .map(|e| format!("{}[{}](#{})", BULLET, e.title, e.anchor))
        .collect::<Vec<_>>()
        .join("\n");
    Some(Section::new(SectionKind::TableOfContents, body))
}

/// Builds the document for validated fields.
///
/// Deterministic: identical fields always produce an identical document.
pub fn assemble(fields: &ValidFields) -> Document {
    let optional: Vec<Section> = [
        sections::features(fields),
        sections::tech_stack(fields),
        sections::installation(fields),
        sections::usage(fields),
    ]
    .into_iter()
    .flatten()
    .collect();
    let contributing = sections::contributing(fields);

    let mut linked = optional.clone();
    linked.extend(contributing.clone());
    let toc = table_of_contents(&toc_entries(&linked));

    let mut out = Vec::with_capacity(linked.len() + 5);
    out.push(sections::title(fields));
    out.extend(sections::license_badge(fields.license()));
    out.push(sections::description(fields));
    out.extend(toc);
    out.extend(optional);
    out.push(sections::license(fields.license()));
    out.extend(contributing);

    Document { sections: out }
}

/// Convenience wrapper returning the rendered Markdown.
pub fn assemble_markdown(fields: &ValidFields) -> String {
    assemble(fields).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{License, ProjectFields};

    fn valid(f: ProjectFields) -> ValidFields {
        f.validate().unwrap()
    }

    fn full() -> ProjectFields {
        ProjectFields {
            project_name: "Foo".to_string(),
            description: "A tool.".to_string(),
            features: Some("fast\nsimple".to_string()),
            tech_stack: Some("Rust\nTokio".to_string()),
            installation: Some("cargo install foo".to_string()),
            usage: Some("Run `foo`.".to_string()),
            license: License::Apache2,
            contribution: Some("PRs welcome.".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_anchor_rule() {
        assert_eq!(anchor("Features"), "features");
        assert_eq!(anchor("Tech Stack"), "tech-stack");
        assert_eq!(anchor("Table of Contents"), "table-of-contents");
        assert_eq!(anchor("A  --  b"), "a-b");
    }

    #[test]
    fn test_example_foo() {
        let f = ProjectFields {
            project_name: "Foo".to_string(),
            description: "A tool.".to_string(),
            license: License::Mit,
            features: Some("fast\n\nsimple".to_string()),
            ..Default::default()
        };
        let expected = "# Foo\n\n\
[![License: MIT](https://img.shields.io/badge/License-MIT-yellow.svg)](https://opensource.org/licenses/MIT)\n\n\
## Description\n\nA tool.\n\n\
## Table of Contents\n\n* [Features](#features)\n\n\
## Features\n\n* fast\n* simple\n\n\
## License\n\nThis project is licensed under the MIT License.\n";
        assert_eq!(assemble_markdown(&valid(f)), expected);
    }

    #[test]
    fn test_example_bar_unlicensed() {
        let f = ProjectFields {
            project_name: "Bar".to_string(),
            description: "X".to_string(),
            license: License::None,
            ..Default::default()
        };
        let doc = assemble(&valid(f));
        assert_eq!(
            doc.kinds(),
            vec![
                SectionKind::Title,
                SectionKind::Description,
                SectionKind::License
            ]
        );
        assert_eq!(
            doc.render(),
            "# Bar\n\n## Description\n\nX\n\n## License\n\nThis project is not licensed.\n"
        );
    }

    #[test]
    fn test_multi_line_name_stays_in_title() {
        let mut f = full();
        f.project_name = "Foo\n## Injected".to_string();
        let rendered = assemble_markdown(&valid(f));
        assert!(rendered.starts_with("# Foo ## Injected\n\n[![License"));
        assert!(!rendered.lines().any(|l| l.starts_with("## Injected")));
    }

    #[test]
    fn test_canonical_order_all_sections() {
        let doc = assemble(&valid(full()));
        assert_eq!(
            doc.kinds(),
            vec![
                SectionKind::Title,
                SectionKind::Badge,
                SectionKind::Description,
                SectionKind::TableOfContents,
                SectionKind::Features,
                SectionKind::TechStack,
                SectionKind::Installation,
                SectionKind::Usage,
                SectionKind::License,
                SectionKind::Contributing,
            ]
        );
    }

    #[test]
    fn test_toc_matches_present_optional_sections() {
        let doc = assemble(&valid(full()));
        let anchors: Vec<String> = doc.toc_entries().into_iter().map(|e| e.anchor).collect();
        assert_eq!(
            anchors,
            vec!["features", "tech-stack", "installation", "usage", "contributing"]
        );

        let rendered = doc.render();
        assert!(rendered.contains(
            "## Table of Contents\n\n\
* [Features](#features)\n\
* [Tech Stack](#tech-stack)\n\
* [Installation](#installation)\n\
* [Usage](#usage)\n\
* [Contributing](#contributing)\n\n"
        ));
    }

    #[test]
    fn test_omission_removes_section_and_toc_entry() {
        let mut f = full();
        f.tech_stack = Some("   \n\t".to_string());
        f.usage = None;
        let doc = assemble(&valid(f));
        assert!(!doc.contains(SectionKind::TechStack));
        assert!(!doc.contains(SectionKind::Usage));
        let titles: Vec<&str> = doc.toc_entries().iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Features", "Installation", "Contributing"]);
        let rendered = doc.render();
        assert!(!rendered.contains("Tech Stack"));
        assert!(!rendered.contains("## Usage"));
    }

    #[test]
    fn test_contributing_only_still_gets_toc() {
        let f = ProjectFields {
            project_name: "Baz".to_string(),
            description: "Y".to_string(),
            contribution: Some("Be kind.".to_string()),
            ..Default::default()
        };
        let doc = assemble(&valid(f));
        assert!(doc.contains(SectionKind::TableOfContents));
        assert_eq!(doc.toc_entries().len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let f = valid(full());
        assert_eq!(assemble_markdown(&f), assemble_markdown(&f));
        assert_eq!(assemble(&f), assemble(&f));
    }

    #[test]
    fn test_single_blank_line_between_sections() {
        let mut f = full();
        f.description = "\n\nA tool.\n\n\n".to_string();
        f.contribution = Some("PRs welcome.\n\n".to_string());
        let rendered = assemble_markdown(&valid(f));
        assert!(!rendered.contains("\n\n\n"));
        assert!(rendered.ends_with("PRs welcome.\n"));
        assert!(!rendered.ends_with("\n\n"));
    }
}
