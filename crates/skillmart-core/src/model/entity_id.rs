// ── Entity identifiers ──
//
// The backend hands out Mongo ObjectIds for most documents and UUIDs for
// a few (payment records, seeded fixtures). Both travel as strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical identifier for any marketplace entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    /// Any non-UUID id, usually a 24-hex ObjectId.
    Object(String),
}

impl EntityId {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Object(_) => None,
        }
    }

    /// True for the 24-character hex form Mongo generates.
    pub fn is_object_id(&self) -> bool {
        match self {
            Self::Object(s) => s.len() == 24 && s.chars().all(|c| c.is_ascii_hexdigit()),
            Self::Uuid(_) => false,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Object(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Object(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn object_id_round_trips_through_display() {
        let id: EntityId = "507f1f77bcf86cd799439011".parse().unwrap();
        assert!(id.is_object_id());
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn uuid_strings_become_uuid_ids() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000");
        assert!(id.as_uuid().is_some());
        assert!(!id.is_object_id());
    }

    #[test]
    fn short_ids_are_kept_verbatim() {
        let id = EntityId::from("c1");
        assert_eq!(id, EntityId::Object("c1".into()));
        assert!(!id.is_object_id());
    }
}
