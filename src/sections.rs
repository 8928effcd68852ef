//! Section builders.
//!
//! Each builder turns one field (or the license choice) into a self-contained
//! Markdown fragment. Builders are pure: an absent optional field yields `None`,
//! never an empty heading.

use crate::fields::{License, ValidFields};

/// Position and heading of every section a document may contain.
///
/// Variant order is the canonical document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Title,
    Badge,
    Description,
    TableOfContents,
    Features,
    TechStack,
    Installation,
    Usage,
    License,
    Contributing,
}

impl SectionKind {
    /// Level-2 heading text, if the section has one.
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Self::Title | Self::Badge => None,
            Self::Description => Some("Description"),
            Self::TableOfContents => Some("Table of Contents"),
            Self::Features => Some("Features"),
            Self::TechStack => Some("Tech Stack"),
            Self::Installation => Some("Installation"),
            Self::Usage => Some("Usage"),
            Self::License => Some("License"),
            Self::Contributing => Some("Contributing"),
        }
    }

    /// Sections that exist only when their field is filled in, and that the
    /// table of contents links to.
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            Self::Features | Self::TechStack | Self::Installation | Self::Usage | Self::Contributing
        )
    }
}

/// One heading-delimited Markdown fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

impl Section {
    pub fn new(kind: SectionKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    /// Markdown for this section, without leading or trailing blank lines.
    pub fn render(&self) -> String {
        match self.kind {
            SectionKind::Title => format!("# {}", self.body),
            SectionKind::Badge => self.body.clone(),
            kind => match kind.heading() {
                Some(heading) => format!("## {}\n\n{}", heading, self.body),
                None => self.body.clone(),
            },
        }
    }
}

/// Fence language for installation commands.
pub const INSTALL_FENCE_LANG: &str = "bash";

/// Bullet prefix for list sections.
pub const BULLET: &str = "* ";

pub fn title(fields: &ValidFields) -> Section {
    Section::new(SectionKind::Title, fields.project_name())
}

/// Badge image linking to the license text. `None` for an unlicensed project.
pub fn badge_markdown(license: License) -> Option<&'static str> {
    match license {
        License::Mit => Some(
            "[![License: MIT](https://img.shields.io/badge/License-MIT-yellow.svg)](https://opensource.org/licenses/MIT)",
        ),
        License::Apache2 => Some(
            "[![License: Apache 2.0](https://img.shields.io/badge/License-Apache_2.0-blue.svg)](https://opensource.org/licenses/Apache-2.0)",
        ),
        License::Gpl3 => Some(
            "[![License: GPL v3](https://img.shields.io/badge/License-GPLv3-blue.svg)](https://www.gnu.org/licenses/gpl-3.0)",
        ),
        License::Bsd3Clause => Some(
            "[![License: BSD 3-Clause](https://img.shields.io/badge/License-BSD_3--Clause-blue.svg)](https://opensource.org/licenses/BSD-3-Clause)",
        ),
        License::None => None,
    }
}

pub fn license_badge(license: License) -> Option<Section> {
    badge_markdown(license).map(|badge| Section::new(SectionKind::Badge, badge))
}

pub fn description(fields: &ValidFields) -> Section {
    Section::new(
        SectionKind::Description,
        trim_blank_lines(fields.description()),
    )
}

pub fn features(fields: &ValidFields) -> Option<Section> {
    fields
        .features()
        .and_then(bullet_list)
        .map(|body| Section::new(SectionKind::Features, body))
}

pub fn tech_stack(fields: &ValidFields) -> Option<Section> {
    fields
        .tech_stack()
        .and_then(bullet_list)
        .map(|body| Section::new(SectionKind::TechStack, body))
}

/// Installation steps go into a fenced block exactly as typed.
pub fn installation(fields: &ValidFields) -> Option<Section> {
    fields.installation().map(|steps| {
        Section::new(
            SectionKind::Installation,
            format!("```{}\n{}\n```", INSTALL_FENCE_LANG, steps),
        )
    })
}

pub fn usage(fields: &ValidFields) -> Option<Section> {
    fields
        .usage()
        .map(|text| Section::new(SectionKind::Usage, trim_blank_lines(text)))
}

pub fn license(license: License) -> Section {
    let body = if license.is_none() {
        "This project is not licensed.".to_string()
    } else {
        format!("This project is licensed under the {} License.", license)
    };
    Section::new(SectionKind::License, body)
}

pub fn contributing(fields: &ValidFields) -> Option<Section> {
    fields
        .contribution()
        .map(|text| Section::new(SectionKind::Contributing, trim_blank_lines(text)))
}

/// Renders each non-blank line as a `* ` bullet.
///
/// Returns `None` when no line survives trimming.
pub fn bullet_list(text: &str) -> Option<String> {
    let items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("{}{}", BULLET, line))
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items.join("\n"))
    }
}

/// Drops blank lines before the first and after the last line of content.
///
/// Indentation of the first content line is kept.
fn trim_blank_lines(text: &str) -> &str {
    let Some(first) = text.find(|c: char| !c.is_whitespace()) else {
        return "";
    };
    let start = text[..first].rfind('\n').map_or(0, |i| i + 1);
    let end = text.trim_end().len();
    &text[start..end]
}
