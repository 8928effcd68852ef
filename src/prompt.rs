//! Prompt compiler for the remote generation path.
//!
//! The instruction asks the model for the same document shape the local
//! assembler produces, so both strategies are interchangeable for callers.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::fields::ValidFields;
use crate::sections::{BULLET, INSTALL_FENCE_LANG};

/// Placeholder for optional fields the user left empty.
pub const NOT_SPECIFIED: &str = "Not specified";

/// README instruction template. `{{name}}` slots are filled by [`compile`].
pub const README_PROMPT: &str = r#"Generate a professional README.md file for a GitHub project with the following details:

Project Name: {{project_name}}
Project Type: {{project_type}}
Description: {{description}}
Features: {{features}}
Tech Stack: {{tech_stack}}
Installation: {{installation}}
Usage: {{usage}}
License: {{license}}
Contribution Guidelines: {{contribution}}

The README must contain these sections, in this order:
1. Title: the project name as a level-1 heading (`# `)
2. License badge: a shields.io badge image linking to the license, directly below the title (omit when the license is None)
3. Description (level-2 heading)
4. Table of Contents (level-2 heading) linking to each of the sections 5-8 and 10 that are present, using lower-case hyphenated anchors
5. Features (level-2 heading, as bullet points)
6. Tech Stack (level-2 heading, as bullet points)
7. Installation (level-2 heading, commands in a fenced code block)
8. Usage (level-2 heading)
9. License (level-2 heading)
10. Contributing (level-2 heading)

Formatting rules:
- Use `## ` for every section heading after the title.
- Start every bullet with `{{bullet}}`.
- Tag installation code blocks with `{{fence_lang}}`.
- Separate sections with exactly one blank line.
- Leave out a section entirely when its detail above is "{{not_specified}}"; never emit an empty heading.

Respond with the Markdown document only, without commentary and without wrapping it in a code block."#;

static SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("static regex is valid"));

fn or_not_specified(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_SPECIFIED)
}

/// Renders the instruction text for `fields`.
///
/// Substitution is single-pass, so field values that happen to contain
/// `{{...}}` are passed through untouched.
pub fn compile(fields: &ValidFields) -> String {
    SLOT.replace_all(README_PROMPT, |caps: &Captures| {
        let value = match &caps[1] {
            "project_name" => fields.project_name(),
            "project_type" => fields.project_type().label(),
            "description" => fields.description(),
            "features" => or_not_specified(fields.features()),
            "tech_stack" => or_not_specified(fields.tech_stack()),
            "installation" => or_not_specified(fields.installation()),
            "usage" => or_not_specified(fields.usage()),
            "license" => fields.license().name(),
            "contribution" => or_not_specified(fields.contribution()),
            "bullet" => BULLET.trim_end(),
            "fence_lang" => INSTALL_FENCE_LANG,
            "not_specified" => NOT_SPECIFIED,
            _ => return caps[0].to_string(),
        };
        value.to_string()
    })
    .into_owned()
}
