use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Local identifier of an entity, assigned by its repository on `create`.
///
/// Freshly constructed entities carry [`EntityId::unassigned`] until the
/// repository replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    const UNASSIGNED: u64 = 0;

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn unassigned() -> Self {
        Self(Self::UNASSIGNED)
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == Self::UNASSIGNED
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        match trimmed.parse::<u64>() {
            Ok(value) if value != Self::UNASSIGNED => Ok(Self(value)),
            Ok(_) => Err(ValidationError::InvalidId(format!(
                "Entity id {} is reserved for unsaved entities",
                trimmed
            ))),
            Err(_) => Err(ValidationError::InvalidId(format!(
                "Entity id must be a positive integer, got '{}'",
                trimmed
            ))),
        }
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NotionId - identifier of a remote Notion page or database row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotionId(String); // bare 32-digit form

impl NotionId {
    const UNASSIGNED: &'static str = "00000000000000000000000000000000";

    /// Placeholder carried by rows that have not been upserted yet.
    pub fn unassigned() -> Self {
        NotionId(Self::UNASSIGNED.to_string())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == Self::UNASSIGNED
    }

    /// Fresh random id, as the remote side hands out on page creation.
    pub fn new_v4() -> Self {
        NotionId(Uuid::new_v4().as_simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accepts the hyphenated and the bare 32-digit forms.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned = input.trim().trim_end_matches('/');

        Uuid::parse_str(cleaned)
            .map(|uuid| NotionId(uuid.as_simple().to_string()))
            .map_err(|_| {
                ValidationError::InvalidId(format!("Could not parse Notion ID from: {}", input))
            })
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NotionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NotionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NotionId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_parsing() {
        assert_eq!(EntityId::parse(" 42 ").unwrap(), EntityId::new(42));
        assert!(EntityId::parse("0").is_err());
        assert!(EntityId::parse("-3").is_err());
        assert!(EntityId::parse("abc").is_err());
        assert!(EntityId::unassigned().is_unassigned());
    }

    #[test]
    fn notion_id_parsing() {
        let id = NotionId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = NotionId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = NotionId::parse(" 550E8400E29B41D4A716446655440000/").unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let url = "https://www.notion.so/Page-550e8400e29b41d4a716446655440000";
        assert!(NotionId::parse(url).is_err());
        assert!(NotionId::parse("too-short").is_err());
        assert!(NotionId::parse("").is_err());
    }

    #[test]
    fn fresh_notion_ids_are_distinct_and_assigned() {
        let a = NotionId::new_v4();
        let b = NotionId::new_v4();
        assert_ne!(a, b);
        assert!(!a.is_unassigned());
        assert!(NotionId::unassigned().is_unassigned());
        assert_eq!(NotionId::parse(a.as_str()).unwrap(), a);
    }
}
