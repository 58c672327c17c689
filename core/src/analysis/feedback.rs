use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Category {
    Documentation,
    Structure,
    Design,
    #[serde(rename = "Error Handling")]
    #[strum(serialize = "Error Handling")]
    ErrorHandling,
    Robustness,
    Style,
    #[serde(rename = "Modern Java")]
    #[strum(serialize = "Modern Java")]
    ModernJava,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFeedback {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub category: Category,
}

impl QualityFeedback {
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            details: None,
            category,
        }
    }

    pub fn success(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, category, message)
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    pub fn info(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serialize_wire_shape() {
        let f = QualityFeedback::warning(Category::ErrorHandling, "Empty catch blocks");
        assert_eq!(
            serde_json::to_string(&f).unwrap(),
            r#"{"type":"warning","message":"Empty catch blocks","category":"Error Handling"}"#
        );
        assert_eq!(Category::ModernJava.to_string(), "Modern Java");
        assert_eq!(Severity::Info.to_string(), "info");
    }
}
