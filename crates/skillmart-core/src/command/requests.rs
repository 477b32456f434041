// ── Typed request payloads for mutating commands ──
//
// Field-level input as the CLI collects it. Validation lives in
// `crate::validate`; conversion to wire bodies happens at the bottom.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use skillmart_api::types::{CouponCreate, CouponUpdate, UserCreate, UserUpdate};

use crate::model::{Role, RoleProfile};

#[derive(Debug, Clone)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_percentage: u8,
    pub max_uses: u32,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCouponRequest {
    pub code: Option<String>,
    pub discount_percentage: Option<u8>,
    pub max_uses: Option<u32>,
    pub expiry: Option<DateTime<Utc>>,
}

impl UpdateCouponRequest {
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.discount_percentage.is_none()
            && self.max_uses.is_none()
            && self.expiry.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub profile: RoleProfile,
}

/// Partial user update. Role-specific fields are checked against the
/// target role (the new one when `role` is set, else the current one).
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub education: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub bio: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.education.is_none()
            && self.expertise.is_none()
            && self.bio.is_none()
    }
}

// ── Wire conversion ─────────────────────────────────────────────────

impl From<&CreateCouponRequest> for CouponCreate {
    fn from(r: &CreateCouponRequest) -> Self {
        Self {
            code: r.code.trim().to_owned(),
            discount_percentage: r.discount_percentage,
            max_uses: r.max_uses,
            expiry_date: r.expiry,
        }
    }
}

impl From<&UpdateCouponRequest> for CouponUpdate {
    fn from(r: &UpdateCouponRequest) -> Self {
        Self {
            code: r.code.as_deref().map(|c| c.trim().to_owned()),
            discount_percentage: r.discount_percentage,
            max_uses: r.max_uses,
            expiry_date: r.expiry,
        }
    }
}

impl From<&CreateUserRequest> for UserCreate {
    fn from(r: &CreateUserRequest) -> Self {
        let (education, expertise, bio) = match &r.profile {
            RoleProfile::Student { education } => (education.clone(), None, None),
            RoleProfile::Instructor { expertise, bio } => {
                (None, Some(expertise.clone()), bio.clone())
            }
            RoleProfile::Admin | RoleProfile::Unknown { .. } => (None, None, None),
        };
        Self {
            name: r.name.trim().to_owned(),
            email: r.email.trim().to_owned(),
            password: r.password.expose_secret().to_owned(),
            role: r.profile.role_name(),
            education,
            expertise,
            bio,
        }
    }
}

impl From<&UpdateUserRequest> for UserUpdate {
    fn from(r: &UpdateUserRequest) -> Self {
        Self {
            name: r.name.as_deref().map(|n| n.trim().to_owned()),
            email: r.email.as_deref().map(|e| e.trim().to_owned()),
            role: r.role.map(|role| role.to_string()),
            education: r.education.clone(),
            expertise: r.expertise.clone(),
            bio: r.bio.clone(),
        }
    }
}
