//! Changelog types and formatting
//!
//! The `Changelog` is the only shape the LLM is allowed to produce. Parsing is
//! strict: exactly the three category keys, each an array of non-empty strings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum_macros::{Display, EnumIter};

/// Categorized, human-readable summary of the changes in one version
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Changelog {
    /// New features, enhancements, or significant additions
    pub features: Vec<String>,
    /// Bug fixes or corrections
    pub fixes: Vec<String>,
    /// Performance improvements, refactoring, documentation, or maintenance
    pub improvements: Vec<String>,
}

/// The three changelog categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ChangelogCategory {
    Features,
    Fixes,
    Improvements,
}

impl ChangelogCategory {
    /// JSON key used by the schema
    pub const fn key(self) -> &'static str {
        match self {
            Self::Features => "features",
            Self::Fixes => "fixes",
            Self::Improvements => "improvements",
        }
    }
}

impl Changelog {
    /// Parse untrusted LLM output into a schema-conformant changelog.
    ///
    /// The text is trimmed and parsed as-is; malformed JSON is never repaired.
    pub fn from_llm_response(text: &str) -> Result<Self, String> {
        let changelog: Self = serde_json::from_str(text.trim())
            .map_err(|e| format!("response is not a valid changelog JSON object: {e}"))?;
        changelog.validate()?;
        Ok(changelog)
    }

    /// Check that every entry is a non-empty sentence
    pub fn validate(&self) -> Result<(), String> {
        for category in [
            ChangelogCategory::Features,
            ChangelogCategory::Fixes,
            ChangelogCategory::Improvements,
        ] {
            if let Some(index) = self.items(category).iter().position(|s| s.trim().is_empty()) {
                return Err(format!("'{}' entry {index} is empty", category.key()));
            }
        }
        Ok(())
    }

    /// Items for one category
    pub fn items(&self, category: ChangelogCategory) -> &[String] {
        match category {
            ChangelogCategory::Features => &self.features,
            ChangelogCategory::Fixes => &self.fixes,
            ChangelogCategory::Improvements => &self.improvements,
        }
    }

    /// Total number of entries across all categories
    pub fn len(&self) -> usize {
        self.features.len() + self.fixes.len() + self.improvements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the changelog as markdown for export.
    ///
    /// Empty categories are omitted; every item appears exactly once under
    /// its category heading.
    pub fn to_markdown(&self, version: &str) -> String {
        let mut content = format!("# Changelog - {version}\n\n");
        for category in [
            ChangelogCategory::Features,
            ChangelogCategory::Fixes,
            ChangelogCategory::Improvements,
        ] {
            let items = self.items(category);
            if items.is_empty() {
                continue;
            }
            content.push_str(&format!("## {category}\n"));
            for item in items {
                content.push_str(&format!("- {item}\n"));
            }
            content.push('\n');
        }
        content.trim().to_string()
    }

    /// Response schema in the structured-output dialect the LLM API expects
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "features": {
                    "type": "ARRAY",
                    "description": "List of summaries for new features, enhancements, or significant additions.",
                    "items": { "type": "STRING" }
                },
                "fixes": {
                    "type": "ARRAY",
                    "description": "List of summaries for bug fixes or corrections.",
                    "items": { "type": "STRING" }
                },
                "improvements": {
                    "type": "ARRAY",
                    "description": "List of summaries for performance improvements, refactoring, documentation, or other maintenance tasks.",
                    "items": { "type": "STRING" }
                }
            },
            "required": ["features", "fixes", "improvements"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn sample() -> Changelog {
        Changelog {
            features: vec!["Added dark mode.".to_string()],
            fixes: vec!["Fixed a crash on startup.".to_string()],
            improvements: vec![],
        }
    }

    #[test]
    fn test_parses_conformant_json_with_whitespace() {
        let text = "\n  {\"features\":[\"A\"],\"fixes\":[],\"improvements\":[\"B\"]}  \n";
        let changelog = Changelog::from_llm_response(text).expect("should parse");
        assert_eq!(changelog.features, vec!["A"]);
        assert_eq!(changelog.improvements, vec!["B"]);
    }

    #[test]
    fn test_rejects_missing_key() {
        let err = Changelog::from_llm_response(r#"{"features":[],"fixes":[]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_extra_key() {
        let err = Changelog::from_llm_response(
            r#"{"features":[],"fixes":[],"improvements":[],"breaking":[]}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_non_string_items() {
        let err = Changelog::from_llm_response(r#"{"features":[1],"fixes":[],"improvements":[]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_blank_items() {
        let err = Changelog::from_llm_response(r#"{"features":["  "],"fixes":[],"improvements":[]}"#)
            .expect_err("blank entries are not sentences");
        assert!(err.contains("features"));
    }

    #[test]
    fn test_does_not_repair_fenced_json() {
        let text = "```json\n{\"features\":[],\"fixes\":[],\"improvements\":[]}\n```";
        assert!(Changelog::from_llm_response(text).is_err());
    }

    #[test]
    fn test_markdown_omits_empty_sections() {
        let md = sample().to_markdown("v1.2.0");
        assert!(md.starts_with("# Changelog - v1.2.0"));
        assert!(md.contains("## Features\n- Added dark mode."));
        assert!(md.contains("## Fixes\n- Fixed a crash on startup."));
        assert!(!md.contains("## Improvements"));
    }

    #[test]
    fn test_markdown_lists_each_item_once_under_its_heading() {
        let changelog = Changelog {
            features: vec!["Added export.".to_string(), "Added import.".to_string()],
            fixes: vec!["Fixed login.".to_string(), "Fixed logout.".to_string()],
            improvements: vec!["Faster search.".to_string(), "Smaller bundle.".to_string()],
        };
        let md = changelog.to_markdown("v2.0.0");

        let features = md.find("## Features").expect("features heading");
        let fixes = md.find("## Fixes").expect("fixes heading");
        let improvements = md.find("## Improvements").expect("improvements heading");
        assert!(features < fixes && fixes < improvements);

        let sections = [
            (features, fixes, &changelog.features),
            (fixes, improvements, &changelog.fixes),
            (improvements, md.len(), &changelog.improvements),
        ];
        for (start, end, items) in sections {
            for item in items {
                let line = format!("- {item}");
                assert_eq!(md.matches(line.as_str()).count(), 1, "{item}");
                let at = md.find(line.as_str()).expect("item present");
                assert!(start < at && at < end, "{item} is outside its section");
            }
        }
    }

    #[test]
    fn test_category_keys_match_schema() {
        let schema = Changelog::response_schema();
        for category in ChangelogCategory::iter() {
            assert!(schema["properties"].get(category.key()).is_some());
        }
    }
}
