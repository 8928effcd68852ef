//! Project fields supplied by the form collaborator.
//!
//! `ProjectFields` is the raw, deserializable shape. `validate()` turns it into
//! `ValidFields`, the only type the synthesis functions accept.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of project being described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Web,
    Mobile,
    Library,
    Api,
    Cli,
    Other,
}

impl ProjectType {
    /// Human-readable label used in the generation prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Web => "web application",
            Self::Mobile => "mobile application",
            Self::Library => "library",
            Self::Api => "API",
            Self::Cli => "CLI tool",
            Self::Other => "other",
        }
    }
}

/// License choice. `None` is an explicit "not licensed" selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum License {
    #[default]
    #[serde(rename = "MIT")]
    Mit,
    #[serde(rename = "Apache-2.0")]
    Apache2,
    #[serde(rename = "GPL-3.0")]
    Gpl3,
    #[serde(rename = "BSD-3-Clause")]
    Bsd3Clause,
    #[serde(rename = "None")]
    None,
}

impl License {
    /// Display name, identical to the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mit => "MIT",
            Self::Apache2 => "Apache-2.0",
            Self::Gpl3 => "GPL-3.0",
            Self::Bsd3Clause => "BSD-3-Clause",
            Self::None => "None",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw field values, as handed over by the form collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectFields {
    pub project_name: String,
    pub description: String,
    pub project_type: ProjectType,
    pub features: Option<String>,
    pub tech_stack: Option<String>,
    pub installation: Option<String>,
    pub usage: Option<String>,
    pub license: License,
    pub contribution: Option<String>,
}

/// A required field was missing or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project name is required")]
    MissingProjectName,
    #[error("description is required")]
    MissingDescription,
}

impl ProjectFields {
    /// Checks the required fields and returns a snapshot the engine can synthesize from.
    pub fn validate(&self) -> Result<ValidFields, ValidationError> {
        if is_blank(&self.project_name) {
            return Err(ValidationError::MissingProjectName);
        }
        if is_blank(&self.description) {
            return Err(ValidationError::MissingDescription);
        }
        let mut fields = self.clone();
        fields.project_name = single_line(&self.project_name);
        Ok(ValidFields(fields))
    }
}

/// Fields whose project name and description are known to be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFields(ProjectFields);

impl ValidFields {
    /// Project name on a single line.
    pub fn project_name(&self) -> &str {
        &self.0.project_name
    }

    pub fn description(&self) -> &str {
        &self.0.description
    }

    pub fn project_type(&self) -> ProjectType {
        self.0.project_type
    }

    pub fn license(&self) -> License {
        self.0.license
    }

    pub fn features(&self) -> Option<&str> {
        present(&self.0.features)
    }

    pub fn tech_stack(&self) -> Option<&str> {
        present(&self.0.tech_stack)
    }

    pub fn installation(&self) -> Option<&str> {
        present(&self.0.installation)
    }

    pub fn usage(&self) -> Option<&str> {
        present(&self.0.usage)
    }

    pub fn contribution(&self) -> Option<&str> {
        present(&self.0.contribution)
    }

    pub fn as_fields(&self) -> &ProjectFields {
        &self.0
    }
}

/// Collapses every whitespace run, line breaks included, into one space.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// An optional field counts only when it carries a non-whitespace character.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !is_blank(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, description: &str) -> ProjectFields {
        ProjectFields {
            project_name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let f = ProjectFields::default();
        assert_eq!(f.project_type, ProjectType::Web);
        assert_eq!(f.license, License::Mit);
    }

    #[test]
    fn test_validate_missing_name() {
        assert_eq!(
            fields("", "A tool.").validate(),
            Err(ValidationError::MissingProjectName)
        );
        assert_eq!(
            fields("   ", "A tool.").validate(),
            Err(ValidationError::MissingProjectName)
        );
    }

    #[test]
    fn test_validate_missing_description() {
        assert_eq!(
            fields("Foo", "\n\t").validate(),
            Err(ValidationError::MissingDescription)
        );
    }

    #[test]
    fn test_whitespace_only_optional_is_absent() {
        let mut f = fields("Foo", "A tool.");
        f.features = Some("  \n \n".to_string());
        f.usage = Some(String::new());
        f.contribution = Some("Open a PR".to_string());
        let valid = f.validate().unwrap();
        assert_eq!(valid.features(), None);
        assert_eq!(valid.usage(), None);
        assert_eq!(valid.tech_stack(), None);
        assert_eq!(valid.contribution(), Some("Open a PR"));
    }

    #[test]
    fn test_project_name_collapsed_to_one_line() {
        let valid = fields(" Foo\n## Injected \r\n bar\t", "A tool.")
            .validate()
            .unwrap();
        assert_eq!(valid.project_name(), "Foo ## Injected bar");
    }

    #[test]
    fn test_deserialize_camel_case_json() {
        let json = r#"{
            "projectName": "Foo",
            "description": "A tool.",
            "projectType": "cli",
            "techStack": "Rust",
            "license": "Apache-2.0"
        }"#;
        let f: ProjectFields = serde_json::from_str(json).unwrap();
        assert_eq!(f.project_name, "Foo");
        assert_eq!(f.project_type, ProjectType::Cli);
        assert_eq!(f.tech_stack.as_deref(), Some("Rust"));
        assert_eq!(f.license, License::Apache2);
        assert!(f.features.is_none());
    }

    #[test]
    fn test_deserialize_license_none() {
        let f: ProjectFields = toml::from_str(
            r#"
projectName = "Bar"
description = "X"
license = "None"
"#,
        )
        .unwrap();
        assert!(f.license.is_none());
    }

    #[test]
    fn test_unknown_license_rejected() {
        let result: Result<ProjectFields, _> =
            serde_json::from_str(r#"{"projectName":"a","description":"b","license":"WTFPL"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_project_type_labels() {
        assert_eq!(ProjectType::Web.label(), "web application");
        assert_eq!(ProjectType::Cli.label(), "CLI tool");
    }
}
