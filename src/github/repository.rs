//! Repository reference resolution
//!
//! Turns a user-supplied GitHub URL into a normalized `owner/name` pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ChangelogError;

/// The only host accepted for repository URLs
pub const GITHUB_HOST: &str = "github.com";

const GIT_SUFFIX: &str = ".git";

/// Normalized GitHub repository identifier
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Parse a GitHub repository URL such as `https://github.com/acme/widgets.git`.
    ///
    /// Extra path segments (`/tree/main`, `/pulls`, ...) are ignored.
    pub fn parse(input: &str) -> Result<Self, ChangelogError> {
        let invalid = || ChangelogError::InvalidRepositoryReference(input.to_string());

        let url = Url::parse(input.trim()).map_err(|_| invalid())?;
        if url.host_str() != Some(GITHUB_HOST) {
            return Err(invalid());
        }

        let mut segments = url
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|segment| !segment.is_empty());

        let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
            return Err(invalid());
        };

        let name = name.strip_suffix(GIT_SUFFIX).unwrap_or(name);
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// `owner/name`, used as the connected repository id
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Trimmed owner/name with any stray `.git` removed, or an error if either is empty
    pub fn normalized(&self) -> Result<(String, String), ChangelogError> {
        let owner = self.owner.trim();
        let name = self.name.trim();
        let name = name.strip_suffix(GIT_SUFFIX).unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(ChangelogError::InvalidRepositoryReference(
                "Repository owner and name cannot be empty".to_string(),
            ));
        }

        Ok((owner.to_string(), name.to_string()))
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_git_suffix() {
        let repo = RepositoryRef::parse("https://github.com/acme/widgets.git").expect("valid url");
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
    }

    #[test]
    fn test_parse_ignores_trailing_segments() {
        let repo = RepositoryRef::parse("https://github.com/acme/widgets/tree/main/src")
            .expect("valid url");
        assert_eq!(repo.full_name(), "acme/widgets");
    }

    #[test]
    fn test_parse_collapses_empty_segments() {
        let repo = RepositoryRef::parse("https://github.com//acme//widgets/").expect("valid url");
        assert_eq!(repo.full_name(), "acme/widgets");
    }

    #[test]
    fn test_parse_rejects_bare_git_name() {
        assert!(RepositoryRef::parse("https://github.com/acme/.git").is_err());
    }

    #[test]
    fn test_parse_rejects_incomplete_or_foreign_urls() {
        for url in [
            "https://github.com/acme",
            "https://github.com/",
            "https://gitlab.com/acme/widgets",
            "not a url",
        ] {
            assert!(
                matches!(
                    RepositoryRef::parse(url),
                    Err(ChangelogError::InvalidRepositoryReference(_))
                ),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalized_trims_and_rejects_blank() {
        let repo = RepositoryRef {
            owner: "  acme ".to_string(),
            name: " widgets.git ".to_string(),
        };
        assert_eq!(
            repo.normalized().expect("non-empty"),
            ("acme".to_string(), "widgets".to_string())
        );

        let blank = RepositoryRef {
            owner: "   ".to_string(),
            name: "widgets".to_string(),
        };
        assert!(matches!(
            blank.normalized(),
            Err(ChangelogError::InvalidRepositoryReference(_))
        ));
    }
}
