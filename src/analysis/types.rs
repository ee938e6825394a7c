//! Request / result types shared by the analysis adapter, the controller and
//! the UI.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ExpertiseLevel
// ---------------------------------------------------------------------------

/// Tone / verbosity of the generated explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    /// Friendly and educational.
    #[default]
    Junior,
    /// Concise and technical.
    Senior,
    /// Humorous and very patient.
    Intern,
}

impl ExpertiseLevel {
    pub const ALL: [ExpertiseLevel; 3] = [
        ExpertiseLevel::Junior,
        ExpertiseLevel::Senior,
        ExpertiseLevel::Intern,
    ];

    /// Parse a selector label.  Unknown labels fall back to the default
    /// level instead of failing.
    ///
    /// ```
    /// use it_works_locally::analysis::ExpertiseLevel;
    ///
    /// assert_eq!(ExpertiseLevel::from_label("Senior"), ExpertiseLevel::Senior);
    /// assert_eq!(ExpertiseLevel::from_label("staff"), ExpertiseLevel::Junior);
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "junior" => ExpertiseLevel::Junior,
            "senior" => ExpertiseLevel::Senior,
            "intern" => ExpertiseLevel::Intern,
            other => {
                log::debug!("unknown expertise level {other:?}, using default");
                ExpertiseLevel::default()
            }
        }
    }

    /// Label shown on the selector button.
    pub fn label(&self) -> &'static str {
        match self {
            ExpertiseLevel::Junior => "Junior Dev",
            ExpertiseLevel::Senior => "Senior Dev",
            ExpertiseLevel::Intern => "Intern who just mass-applied",
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisRequest
// ---------------------------------------------------------------------------

/// Submission rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please paste an error log or code snippet first.")]
    EmptyErrorText,
}

/// One submission of the form.  Blank environment fields mean "not provided".
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub error_text: String,
    pub local_env: String,
    pub prod_env: String,
    pub expertise: ExpertiseLevel,
}

impl AnalysisRequest {
    pub fn new(
        error_text: impl Into<String>,
        local_env: impl Into<String>,
        prod_env: impl Into<String>,
        expertise: ExpertiseLevel,
    ) -> Self {
        Self {
            error_text: error_text.into(),
            local_env: local_env.into(),
            prod_env: prod_env.into(),
            expertise,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.error_text.trim().is_empty() {
            return Err(ValidationError::EmptyErrorText);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Category / Severity
// ---------------------------------------------------------------------------

/// Broad classification of the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Environment,
    Dependencies,
    Configuration,
    Api,
    Database,
    Authentication,
    Network,
    Memory,
    Permissions,
    Build,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Environment,
        Category::Dependencies,
        Category::Configuration,
        Category::Api,
        Category::Database,
        Category::Authentication,
        Category::Network,
        Category::Memory,
        Category::Permissions,
        Category::Build,
    ];

    /// Case-insensitive lookup; `None` for anything unrecognised.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(value))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Environment => "Environment",
            Category::Dependencies => "Dependencies",
            Category::Configuration => "Configuration",
            Category::Api => "API",
            Category::Database => "Database",
            Category::Authentication => "Authentication",
            Category::Network => "Network",
            Category::Memory => "Memory",
            Category::Permissions => "Permissions",
            Category::Build => "Build",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Case-insensitive lookup; `None` for anything unrecognised.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(value))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// Structured explanation produced by the analysis model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub root_cause: String,
    pub fix_steps: Vec<String>,
    pub prevention_tips: Vec<String>,
    pub tldr: Option<String>,
    pub category: Option<Category>,
    pub severity: Option<Severity>,
    pub estimated_fix_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_maps_known_levels() {
        assert_eq!(ExpertiseLevel::from_label("junior"), ExpertiseLevel::Junior);
        assert_eq!(ExpertiseLevel::from_label("SENIOR"), ExpertiseLevel::Senior);
        assert_eq!(ExpertiseLevel::from_label(" intern "), ExpertiseLevel::Intern);
    }

    #[test]
    fn from_label_unknown_uses_default() {
        assert_eq!(ExpertiseLevel::from_label("principal"), ExpertiseLevel::Junior);
        assert_eq!(ExpertiseLevel::from_label(""), ExpertiseLevel::Junior);
    }

    #[test]
    fn validate_rejects_blank_error_text() {
        let req = AnalysisRequest::new("  \n\t", "local", "prod", ExpertiseLevel::Senior);
        assert_eq!(req.validate(), Err(ValidationError::EmptyErrorText));
    }

    #[test]
    fn validate_accepts_error_without_environments() {
        let req = AnalysisRequest::new("TypeError: x is undefined", "", "", ExpertiseLevel::Junior);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(Category::parse("api"), Some(Category::Api));
        assert_eq!(Category::parse("NETWORK"), Some(Category::Network));
        assert_eq!(Category::parse(" Build "), Some(Category::Build));
        assert_eq!(Category::parse("Cosmic rays"), None);
    }

    #[test]
    fn severity_parse_and_ordering() {
        assert_eq!(Severity::parse("Critical"), Some(Severity::Critical));
        assert_eq!(Severity::parse("meh"), None);
        assert!(Severity::Low < Severity::Critical);
    }
}
