// ── Admin dashboard aggregates ──

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_students: u64,
    pub total_instructors: u64,
    pub total_courses: u64,
    pub total_enrollments: u64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    pub user_growth: Vec<TrendPoint>,
    pub enrollment_trends: Vec<TrendPoint>,
    pub popular_categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub period: String,
    pub revenue: Decimal,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRevenue {
    pub course_id: EntityId,
    pub title: Option<String>,
    pub revenue: Decimal,
    pub sales: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueStats {
    pub total_revenue: Decimal,
    pub monthly: Vec<RevenuePoint>,
    pub top_courses: Vec<CourseRevenue>,
}

impl RevenueStats {
    /// The month with the highest revenue, if any month is listed.
    pub fn best_month(&self) -> Option<&RevenuePoint> {
        self.monthly.iter().max_by_key(|p| p.revenue)
    }
}

/// Everything the admin dashboard shows, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub analytics: Analytics,
    pub revenue: RevenueStats,
}
