// ── Coupons ──
//
// Status is never stored. It is derived from the expiry date and "now"
// every time a coupon is rendered or filtered.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::EntityId;

/// Coupons within this window of their expiry are flagged.
pub const EXPIRING_SOON_DAYS: i64 = 7;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CouponStatus {
    Active,
    ExpiringSoon,
    Expired,
}

impl CouponStatus {
    /// `Expired` once `now` is past `expiry`; `ExpiringSoon` while at most
    /// seven days remain (inclusive); `Active` otherwise.
    ///
    /// Expiries given as a bare date (from the server or `--expires`) are
    /// read through [`parse_expiry`], which puts them at 23:59:59 UTC.
    pub fn derive(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now > expiry {
            Self::Expired
        } else if expiry - now <= TimeDelta::days(EXPIRING_SOON_DAYS) {
            Self::ExpiringSoon
        } else {
            Self::Active
        }
    }
}

/// RFC 3339, or `YYYY-MM-DD` meaning the end of that day in UTC.
///
/// Same rule the API layer applies to `expiryDate`, so a date typed on
/// the command line and one stored by the server expire together.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    skillmart_api::types::lenient_datetime::parse(raw.trim())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: EntityId,
    pub code: String,
    pub discount_percentage: u8,
    pub max_uses: u32,
    pub used_count: u32,
    pub expiry: DateTime<Utc>,
    pub course_id: Option<EntityId>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn status_at(&self, now: DateTime<Utc>) -> CouponStatus {
        CouponStatus::derive(self.expiry, now)
    }

    pub fn remaining_uses(&self) -> u32 {
        self.max_uses.saturating_sub(self.used_count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_uses() == 0
    }
}

// ── Filtering & sorting ─────────────────────────────────────────────

/// Coupon list filter from the instructor dashboard.
#[derive(Debug, Clone, Default)]
pub struct CouponFilter {
    pub status: Option<CouponStatus>,
    /// Case-insensitive substring of the code.
    pub search: Option<String>,
}

impl CouponFilter {
    pub fn matches(&self, coupon: &Coupon, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.status {
            if coupon.status_at(now) != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => coupon
                .code
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum CouponSort {
    /// Soonest expiry first.
    #[default]
    ExpiryAsc,
    ExpiryDesc,
    DiscountDesc,
    CodeAsc,
    UsesDesc,
}

/// Apply `filter`, then order by `sort`. Ties fall back to the code so the
/// output is stable across re-fetches.
pub fn filter_and_sort<'a>(
    coupons: impl IntoIterator<Item = &'a Coupon>,
    filter: &CouponFilter,
    sort: CouponSort,
    now: DateTime<Utc>,
) -> Vec<&'a Coupon> {
    let mut out: Vec<&Coupon> = coupons
        .into_iter()
        .filter(|c| filter.matches(c, now))
        .collect();

    out.sort_by(|a, b| {
        let primary = match sort {
            CouponSort::ExpiryAsc => a.expiry.cmp(&b.expiry),
            CouponSort::ExpiryDesc => b.expiry.cmp(&a.expiry),
            CouponSort::DiscountDesc => b.discount_percentage.cmp(&a.discount_percentage),
            CouponSort::CodeAsc => std::cmp::Ordering::Equal,
            CouponSort::UsesDesc => b.used_count.cmp(&a.used_count),
        };
        primary.then_with(|| a.code.cmp(&b.code))
    });
    out
}
