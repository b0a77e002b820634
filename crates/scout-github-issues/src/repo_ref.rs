use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository '{raw}', expected owner/repo")]
/// Raised when a repository slug is not of the form `owner/repo`.
pub struct RepoRefParseError {
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `RepoRef` identifying one GitHub repository.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self, RepoRefParseError> {
        let invalid = || RepoRefParseError {
            raw: raw.to_string(),
        };
        let (owner, name) = raw.trim().split_once('/').ok_or_else(invalid)?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::RepoRef;

    #[test]
    fn unit_parse_trims_and_splits_owner_and_name() {
        let repo = RepoRef::parse("  acme / widgets ").expect("valid slug");
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
        assert_eq!(repo.as_slug(), "acme/widgets");
        assert_eq!(repo.html_url(), "https://github.com/acme/widgets");
    }

    #[test]
    fn regression_parse_rejects_missing_or_nested_segments() {
        for raw in ["", "acme", "acme/", "/widgets", "acme/widgets/extra"] {
            let error = RepoRef::parse(raw).expect_err("slug should be rejected");
            assert_eq!(error.raw, raw);
        }
    }
}
