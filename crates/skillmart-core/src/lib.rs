//! Domain layer between `skillmart-api` and the `skillmart` CLI.
//!
//! - **[`Session`]** owns one authenticated [`MarketplaceClient`] and the
//!   local state slices. [`Session::connect()`] authenticates and spawns the
//!   command processor; [`Session::oneshot()`] wraps a single CLI invocation.
//!
//! - **[`DataStore`]** holds whatever was fetched last: courses, coupons,
//!   users, enrollments and the cart. Every mutation re-fetches the
//!   collection it touched, so the store never reconciles incrementally.
//!
//! - **[`Command`]** is a typed mutation routed through an `mpsc` channel.
//!   Reads bypass the channel and call the API directly.
//!
//! - **Domain model** ([`model`]) carries the client-side rules the backend
//!   leaves to its callers: coupon status derivation, the cart toggle and
//!   the display-level totals check. [`validate`] runs form rules before
//!   anything touches the network.
//!
//! [`MarketplaceClient`]: skillmart_api::MarketplaceClient

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{AuthCredentials, SessionConfig, TlsVerification};
pub use error::CoreError;
pub use session::{ConnectionState, Session};
pub use store::DataStore;
pub use validate::ValidationError;

// Read-side query parameters, passed straight through to the client.
pub use skillmart_api::types::{CourseQuery, UserQuery};

pub use model::{
    // Admin
    AdminDashboard,
    AdminStats,
    Analytics,
    // Cart
    AppliedCoupon,
    Cart,
    CartAction,
    CartLine,
    CartTotals,
    CategoryCount,
    // Coupons
    Coupon,
    CouponFilter,
    CouponSort,
    CouponStatus,
    // Catalog
    Course,
    CourseLevel,
    CourseRevenue,
    Enrollment,
    EntityId,
    // Recommendations
    ModelState,
    PaymentIntent,
    Recommendation,
    RevenuePoint,
    RevenueStats,
    // Users
    Role,
    RoleProfile,
    TrainingStatus,
    TrendPoint,
    User,
    UserFilter,
};
