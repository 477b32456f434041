// ── Cart ──
//
// The backend owns pricing. Totals here are always the server's; the
// recomputation below exists only to check that what is displayed adds up.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub course_id: EntityId,
    pub title: String,
    pub thumbnail: Option<String>,
    pub price: Decimal,
    pub applied_coupon: Option<AppliedCoupon>,
    pub discounted_price: Option<Decimal>,
}

impl CartLine {
    /// What the line costs after its coupon, as priced by the server.
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    pub fn discount(&self) -> Decimal {
        self.price - self.effective_price()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub total: Decimal,
}

/// What pressing the cart button on a course does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn contains(&self, course_id: &EntityId) -> bool {
        self.lines.iter().any(|l| &l.course_id == course_id)
    }

    pub fn line(&self, course_id: &EntityId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.course_id == course_id)
    }

    /// A course already in the cart toggles to removal; adding never stacks.
    pub fn action_for(&self, course_id: &EntityId) -> CartAction {
        if self.contains(course_id) {
            CartAction::Remove
        } else {
            CartAction::Add
        }
    }

    pub fn course_ids(&self) -> Vec<EntityId> {
        self.lines.iter().map(|l| l.course_id.clone()).collect()
    }

    /// Totals rebuilt from the listed lines. Display checks only; never
    /// shown in place of [`Cart::totals`].
    pub fn recomputed_totals(&self) -> CartTotals {
        let subtotal: Decimal = self.lines.iter().map(|l| l.price).sum();
        let total_discount: Decimal = self.lines.iter().map(CartLine::discount).sum();
        CartTotals {
            subtotal,
            total_discount,
            total: subtotal - total_discount,
        }
    }

    /// Subtotal equals the sum of listed prices and total equals subtotal
    /// minus the server's discount.
    pub fn totals_consistent(&self) -> bool {
        let listed: Decimal = self.lines.iter().map(|l| l.price).sum();
        self.totals.subtotal == listed
            && self.totals.total == self.totals.subtotal - self.totals.total_discount
    }
}

/// A payment intent created for the cart total. Card confirmation happens
/// with the payment provider, outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: Option<String>,
    pub client_secret: String,
    pub amount: Decimal,
    pub currency: String,
    pub course_ids: Vec<EntityId>,
}
