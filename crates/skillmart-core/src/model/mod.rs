// ── Domain model ──
//
// Canonical types the CLI renders. Built from API DTOs in `convert.rs`;
// none of them has a client-owned lifecycle.

mod admin;
mod cart;
mod coupon;
mod course;
mod entity_id;
mod recommendation;
mod user;

pub use admin::{
    AdminDashboard, AdminStats, Analytics, CategoryCount, CourseRevenue, RevenuePoint,
    RevenueStats, TrendPoint,
};
pub use cart::{AppliedCoupon, Cart, CartAction, CartLine, CartTotals, PaymentIntent};
pub use coupon::{Coupon, CouponFilter, CouponSort, CouponStatus, filter_and_sort, parse_expiry};
pub use course::{Course, CourseLevel, Enrollment};
pub use entity_id::EntityId;
pub use recommendation::{ModelState, Recommendation, TrainingStatus};
pub use user::{Role, RoleProfile, User, UserFilter};
