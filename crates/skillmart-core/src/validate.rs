// ── Form validation ──
//
// Runs before any network call. Each `validate_*` returns every failing
// field at once so a form can mark them all.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;

use crate::command::{CreateCouponRequest, CreateUserRequest, UpdateCouponRequest, UpdateUserRequest};
use crate::model::{Role, RoleProfile};

pub const COUPON_CODE_MIN: usize = 3;
pub const COUPON_CODE_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// ── Coupons ─────────────────────────────────────────────────────────

/// 3 to 20 characters, `A-Z` and `0-9` only. Lowercase is rejected rather
/// than folded so the code the instructor types is the code customers use.
pub fn coupon_code(code: &str) -> Result<(), ValidationError> {
    let len = code.chars().count();
    if !(COUPON_CODE_MIN..=COUPON_CODE_MAX).contains(&len) {
        return Err(ValidationError::new(
            "code",
            format!("must be {COUPON_CODE_MIN}-{COUPON_CODE_MAX} characters (got {len})"),
        ));
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "code",
            "may only contain uppercase letters and digits",
        ));
    }
    Ok(())
}

fn discount(pct: u8) -> Result<(), ValidationError> {
    if (1..=100).contains(&pct) {
        Ok(())
    } else {
        Err(ValidationError::new("discount", "must be between 1 and 100 percent"))
    }
}

fn max_uses(uses: u32) -> Result<(), ValidationError> {
    if uses >= 1 {
        Ok(())
    } else {
        Err(ValidationError::new("max-uses", "must be at least 1"))
    }
}

pub fn validate_coupon_create(
    req: &CreateCouponRequest,
    now: DateTime<Utc>,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    errors.extend(coupon_code(&req.code).err());
    errors.extend(discount(req.discount_percentage).err());
    errors.extend(max_uses(req.max_uses).err());
    if req.expiry <= now {
        errors.push(ValidationError::new("expiry", "must be in the future"));
    }
    finish(errors)
}

/// Only the fields being changed are checked. An expiry in the past is
/// allowed here: it is how an instructor ends a coupon early.
pub fn validate_coupon_update(req: &UpdateCouponRequest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if req.is_empty() {
        errors.push(ValidationError::new("update", "has no fields to change"));
    }
    if let Some(ref code) = req.code {
        errors.extend(coupon_code(code).err());
    }
    if let Some(pct) = req.discount_percentage {
        errors.extend(discount(pct).err());
    }
    if let Some(uses) = req.max_uses {
        errors.extend(max_uses(uses).err());
    }
    finish(errors)
}

// ── Users ───────────────────────────────────────────────────────────

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain.
pub fn email(raw: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::new("email", "must look like name@example.com");
    let raw = raw.trim();
    if raw.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = raw.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

fn name(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        Err(ValidationError::new("name", "must not be empty"))
    } else {
        Ok(())
    }
}

pub fn validate_user_create(req: &CreateUserRequest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    errors.extend(name(&req.name).err());
    errors.extend(email(&req.email).err());
    if req.password.expose_secret().chars().count() < PASSWORD_MIN {
        errors.push(ValidationError::new(
            "password",
            format!("must be at least {PASSWORD_MIN} characters"),
        ));
    }
    if let RoleProfile::Unknown { ref raw } = req.profile {
        errors.push(ValidationError::new(
            "role",
            format!("'{raw}' is not one of student, instructor, admin"),
        ));
    }
    finish(errors)
}

/// `current_role` is the account's role before the update, when known.
pub fn validate_user_update(
    req: &UpdateUserRequest,
    current_role: Option<Role>,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if req.is_empty() {
        errors.push(ValidationError::new("update", "has no fields to change"));
    }
    if let Some(ref n) = req.name {
        errors.extend(name(n).err());
    }
    if let Some(ref e) = req.email {
        errors.extend(email(e).err());
    }
    if req.role == Some(Role::Unknown) {
        errors.push(ValidationError::new(
            "role",
            "must be one of student, instructor, admin",
        ));
    }

    if let Some(role) = req.role.or(current_role) {
        if req.education.is_some() && role != Role::Student {
            errors.push(ValidationError::new("education", "only applies to students"));
        }
        if (req.expertise.is_some() || req.bio.is_some()) && role != Role::Instructor {
            let field = if req.expertise.is_some() { "expertise" } else { "bio" };
            errors.push(ValidationError::new(field, "only applies to instructors"));
        }
    }
    finish(errors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use secrecy::SecretString;

    fn coupon(code: &str, pct: u8, uses: u32, expiry: DateTime<Utc>) -> CreateCouponRequest {
        CreateCouponRequest {
            code: code.into(),
            discount_percentage: pct,
            max_uses: uses,
            expiry,
        }
    }

    #[test]
    fn coupon_code_rules() {
        assert!(coupon_code("SAVE20").is_ok());
        assert!(coupon_code("ABC").is_ok());
        assert!(coupon_code("A2345678901234567890").is_ok());

        assert!(coupon_code("AB").is_err());
        assert!(coupon_code("A23456789012345678901").is_err());
        assert!(coupon_code("save20").is_err());
        assert!(coupon_code("SAVE-20").is_err());
        assert!(coupon_code("SAVE 20").is_err());
    }

    #[test]
    fn create_coupon_collects_every_failure() {
        let now = Utc::now();
        let errors =
            validate_coupon_create(&coupon("x", 0, 0, now - TimeDelta::days(1)), now).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["code", "discount", "max-uses", "expiry"]);
    }

    #[test]
    fn create_coupon_ok() {
        let now = Utc::now();
        assert!(
            validate_coupon_create(&coupon("SPRING25", 25, 100, now + TimeDelta::days(30)), now)
                .is_ok()
        );
        assert!(
            validate_coupon_create(&coupon("FULL", 100, 1, now + TimeDelta::hours(1)), now).is_ok()
        );
    }

    #[test]
    fn update_coupon_checks_only_present_fields() {
        let update = UpdateCouponRequest {
            discount_percentage: Some(101),
            ..UpdateCouponRequest::default()
        };
        let errors = validate_coupon_update(&update).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "discount");

        assert!(validate_coupon_update(&UpdateCouponRequest::default()).is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(email("ann@example.com").is_ok());
        assert!(email(" ann@sub.example.io ").is_ok());
        assert!(email("ann@example").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("ann@@example.com").is_err());
        assert!(email("an n@example.com").is_err());
        assert!(email("ann@example.").is_err());
    }

    #[test]
    fn user_create_rules() {
        let req = CreateUserRequest {
            name: "  ".into(),
            email: "ann@example.com".into(),
            password: SecretString::from("12345".to_owned()),
            profile: RoleProfile::Unknown {
                raw: "moderator".into(),
            },
        };
        let errors = validate_user_create(&req).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "password", "role"]);
    }

    #[test]
    fn role_specific_fields_on_update() {
        let update = UpdateUserRequest {
            education: Some("MSc".into()),
            ..UpdateUserRequest::default()
        };
        assert!(validate_user_update(&update, Some(Role::Student)).is_ok());
        let errors = validate_user_update(&update, Some(Role::Instructor)).unwrap_err();
        assert_eq!(errors[0].to_string(), "education only applies to students");

        let promote = UpdateUserRequest {
            role: Some(Role::Instructor),
            bio: Some("Teaches Rust".into()),
            ..UpdateUserRequest::default()
        };
        assert!(validate_user_update(&promote, Some(Role::Student)).is_ok());
    }
}
