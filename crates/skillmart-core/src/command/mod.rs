// ── Command API ──
//
// Every mutation flows through `Command`. The session validates it,
// performs the single write call, then re-fetches what it touched.

pub mod requests;

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::model::{Cart, Coupon, EntityId, PaymentIntent, TrainingStatus, User};
use crate::validate::{self, ValidationError};

pub use requests::{
    CreateCouponRequest, CreateUserRequest, UpdateCouponRequest, UpdateUserRequest,
};

/// A command plus the channel its result goes back on.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against the marketplace.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Cart ─────────────────────────────────────────────────────────
    AddToCart {
        course_id: EntityId,
    },
    RemoveFromCart {
        course_id: EntityId,
    },
    /// Add when absent, remove when present.
    ToggleCart {
        course_id: EntityId,
    },
    ApplyCoupon {
        course_id: EntityId,
        code: String,
    },
    ClearCart,
    /// Create a payment intent for the current cart total.
    Checkout {
        currency: String,
    },

    // ── Instructor coupons ───────────────────────────────────────────
    CreateCoupon {
        course_id: EntityId,
        request: CreateCouponRequest,
    },
    UpdateCoupon {
        course_id: EntityId,
        coupon_id: EntityId,
        update: UpdateCouponRequest,
    },
    DeleteCoupon {
        course_id: EntityId,
        coupon_id: EntityId,
    },

    // ── User administration ──────────────────────────────────────────
    CreateUser(CreateUserRequest),
    UpdateUser {
        id: EntityId,
        update: UpdateUserRequest,
    },
    DeleteUser {
        id: EntityId,
    },
    SetUserActive {
        id: EntityId,
        active: bool,
    },

    // ── Recommendation model ─────────────────────────────────────────
    TrainModel,
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddToCart { .. } => "add-to-cart",
            Self::RemoveFromCart { .. } => "remove-from-cart",
            Self::ToggleCart { .. } => "toggle-cart",
            Self::ApplyCoupon { .. } => "apply-coupon",
            Self::ClearCart => "clear-cart",
            Self::Checkout { .. } => "checkout",
            Self::CreateCoupon { .. } => "create-coupon",
            Self::UpdateCoupon { .. } => "update-coupon",
            Self::DeleteCoupon { .. } => "delete-coupon",
            Self::CreateUser(_) => "create-user",
            Self::UpdateUser { .. } => "update-user",
            Self::DeleteUser { .. } => "delete-user",
            Self::SetUserActive { .. } => "set-user-active",
            Self::TrainModel => "train-model",
        }
    }

    /// Form rules that need no server state. Runs before the command is
    /// queued, so invalid input never reaches the network.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), CoreError> {
        let result = match self {
            Self::ApplyCoupon { code, .. } => validate::coupon_code(code).map_err(|e| vec![e]),
            Self::Checkout { currency } => {
                if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(())
                } else {
                    Err(vec![ValidationError {
                        field: "currency",
                        reason: "must be a three-letter ISO code".into(),
                    }])
                }
            }
            Self::CreateCoupon { request, .. } => validate::validate_coupon_create(request, now),
            Self::UpdateCoupon { update, .. } => validate::validate_coupon_update(update),
            Self::CreateUser(request) => validate::validate_user_create(request),
            // Role-specific fields are checked again once the current role is known.
            Self::UpdateUser { update, .. } => validate::validate_user_update(update, None),
            Self::AddToCart { .. }
            | Self::RemoveFromCart { .. }
            | Self::ToggleCart { .. }
            | Self::ClearCart
            | Self::DeleteCoupon { .. }
            | Self::DeleteUser { .. }
            | Self::SetUserActive { .. }
            | Self::TrainModel => Ok(()),
        };
        result.map_err(CoreError::validation)
    }
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
    Cart(Cart),
    Coupon(Coupon),
    User(User),
    PaymentIntent(PaymentIntent),
    Training(TrainingStatus),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_coupon_is_rejected_before_queueing() {
        let cmd = Command::ApplyCoupon {
            course_id: EntityId::from("c1"),
            code: "save20".into(),
        };
        let err = cmd.validate(Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn currency_must_be_iso_code() {
        let ok = Command::Checkout {
            currency: "usd".into(),
        };
        assert!(ok.validate(Utc::now()).is_ok());
        let bad = Command::Checkout {
            currency: "dollars".into(),
        };
        assert!(bad.validate(Utc::now()).is_err());
    }
}
