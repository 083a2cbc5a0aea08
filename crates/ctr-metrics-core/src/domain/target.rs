use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TARGET_LEN: usize = 2048;

/// Lookup key sent upstream: a domain, a page URL or a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Target(String);

impl Target {
    /// Trim and validate a domain or URL. Case is preserved so the caller's key round-trips.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTarget { field: "target" });
        }

        let len = trimmed.chars().count();
        if len > MAX_TARGET_LEN {
            return Err(ValidationError::TargetTooLong {
                field: "target",
                len,
                max: MAX_TARGET_LEN,
            });
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::TargetContainsWhitespace {
                field: "target",
                value: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Keywords may contain spaces; only emptiness and length are checked.
    pub fn keyword(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTarget { field: "keyword" });
        }

        let len = trimmed.chars().count();
        if len > MAX_TARGET_LEN {
            return Err(ValidationError::TargetTooLong {
                field: "keyword",
                len,
                max: MAX_TARGET_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Target {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Target> for String {
    fn from(value: Target) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let parsed = Target::parse("  example.com ").expect("target should parse");
        assert_eq!(parsed.as_str(), "example.com");
    }

    #[test]
    fn rejects_blank_input() {
        let err = Target::parse("   ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyTarget { .. }));
    }

    #[test]
    fn rejects_inner_whitespace_for_domains_but_not_keywords() {
        let err = Target::parse("exa mple.com").expect_err("must fail");
        assert!(matches!(err, ValidationError::TargetContainsWhitespace { .. }));

        let keyword = Target::keyword(" running shoes ").expect("keyword should parse");
        assert_eq!(keyword.as_str(), "running shoes");
    }
}
