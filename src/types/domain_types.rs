// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

const MAX_NAME_LENGTH: usize = 100;

static KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[-_][a-z0-9]+)*$")
        .expect("Failed to compile entity key regex - this is a bug in the code")
});

static SPACES_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile whitespace regex - this is a bug in the code")
});

/// Collapses runs of whitespace and trims the ends.
fn clean_name(raw: &str) -> String {
    SPACES_REGEX.replace_all(raw.trim(), " ").into_owned()
}

fn validate_name(raw: &str, field: &'static str) -> Result<String, ValidationError> {
    let cleaned = clean_name(raw);
    if cleaned.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if cleaned.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName {
            value: raw.to_string(),
            reason: format!("longer than {} characters", MAX_NAME_LENGTH),
        });
    }
    Ok(cleaned)
}

/// Human-facing name of an entity. Single line, whitespace-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        validate_name(raw.as_ref(), "name").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityName> for String {
    fn from(value: EntityName) -> Self {
        value.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a branch tag. Tags are matched by name on the remote side, so
/// comparison is on the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let cleaned = validate_name(raw.as_ref(), "tag name")?;
        if cleaned.contains(',') {
            return Err(ValidationError::InvalidName {
                value: cleaned,
                reason: "tag names cannot contain commas".to_string(),
            });
        }
        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TagName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable slug identifying a branch within its trunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let key = raw.as_ref().trim().to_lowercase();
        if key.is_empty() {
            return Err(ValidationError::EmptyField("key"));
        }
        if !KEY_REGEX.is_match(&key) {
            return Err(ValidationError::InvalidKey {
                value: raw.as_ref().to_string(),
                reason: "keys are lowercase letters and digits separated by '-' or '_'"
                    .to_string(),
            });
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityKey> for String {
    fn from(value: EntityKey) -> Self {
        value.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated URL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl Serialize for ValidatedUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidatedUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ValidatedUrl::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl ValidatedUrl {
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        match Url::parse(url.trim()) {
            Ok(parsed_url) => {
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed_url))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side wins when both copies of a record exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPrefer {
    Local,
    #[default]
    Notion,
}

impl FromStr for SyncPrefer {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "notion" => Ok(Self::Notion),
            other => Err(ValidationError::InvalidEnum {
                kind: "sync preference",
                value: other.to_string(),
                expected: "local, notion",
            }),
        }
    }
}

impl fmt::Display for SyncPrefer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Notion => write!(f, "notion"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_name_normalizes_whitespace() {
        let name = EntityName::new("  Write   the\tdraft ").unwrap();
        assert_eq!(name.as_str(), "Write the draft");
        assert_eq!(EntityName::new("   "), Err(ValidationError::EmptyField("name")));
        assert!(EntityName::new("x".repeat(101)).is_err());
    }

    #[test]
    fn test_tag_name_rejects_commas() {
        assert!(TagName::new("home").is_ok());
        assert!(TagName::new("home,work").is_err());
    }

    #[test]
    fn test_entity_key_slug_rules() {
        assert_eq!(EntityKey::new("Weight").unwrap().as_str(), "weight");
        assert!(EntityKey::new("reading-list").is_ok());
        assert!(EntityKey::new("books_2024").is_ok());
        assert!(EntityKey::new("two words").is_err());
        assert!(EntityKey::new("-leading").is_err());
        assert!(EntityKey::new("").is_err());
    }

    #[test]
    fn test_validated_url() {
        assert!(ValidatedUrl::parse("https://example.com/a").is_ok());
        assert!(ValidatedUrl::parse("ftp://example.com").is_err());
        assert!(ValidatedUrl::parse("not a url").is_err());
    }

    #[test]
    fn test_sync_prefer_parsing() {
        assert_eq!("Local".parse::<SyncPrefer>().unwrap(), SyncPrefer::Local);
        assert_eq!("notion".parse::<SyncPrefer>().unwrap(), SyncPrefer::Notion);
        assert!(matches!(
            "remote".parse::<SyncPrefer>(),
            Err(ValidationError::InvalidEnum { .. })
        ));
        assert_eq!(SyncPrefer::Local.to_string(), "local");
    }
}
