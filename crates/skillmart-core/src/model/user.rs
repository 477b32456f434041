// ── Users ──
//
// One record per account. Role-specific fields live in `RoleProfile` so a
// student can never carry instructor expertise and vice versa.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Student,
    Instructor,
    Admin,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Student {
        education: Option<String>,
    },
    Instructor {
        expertise: Vec<String>,
        bio: Option<String>,
    },
    Admin,
    /// A role this client does not know; kept so the account still lists.
    Unknown {
        raw: String,
    },
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::Instructor { .. } => Role::Instructor,
            Self::Admin => Role::Admin,
            Self::Unknown { .. } => Role::Unknown,
        }
    }

    /// Wire name of the role (`"student"`, ...).
    pub fn role_name(&self) -> String {
        match self {
            Self::Unknown { raw } => raw.clone(),
            other => other.role().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub active: bool,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub avatar: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

/// Admin user table filter.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub active: Option<bool>,
    /// Case-insensitive substring of the name or email.
    pub search: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|r| r != user.role()) {
            return false;
        }
        if self.active.is_some_and(|a| a != user.active) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}
