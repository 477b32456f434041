// Endpoint groups, each an `impl MarketplaceClient` block.

mod admin;
mod auth;
mod cart;
mod coupons;
mod courses;
mod payment;
mod recommendations;
mod users;
