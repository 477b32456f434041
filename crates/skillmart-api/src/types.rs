// Request and response bodies for the SkillMart REST API.
//
// Field names follow the backend's camelCase JSON. Mongo-style `_id` is
// accepted wherever `id` is expected. Optional fields default instead of
// failing, since older backend builds omit several of them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

// ── Lists ────────────────────────────────────────────────────────────

/// A list endpoint response: either a bare JSON array or an object
/// holding the array under one of the names the backend uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped(WrappedList<T>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrappedList<T> {
    #[serde(
        alias = "data",
        alias = "courses",
        alias = "users",
        alias = "coupons",
        alias = "enrollments",
        alias = "recommendations",
        alias = "similar",
        alias = "results"
    )]
    pub items: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped(WrappedList { items }) => items,
        }
    }
}

// ── Dates ────────────────────────────────────────────────────────────

/// Coupon expiry dates come from an HTML date input on some code paths,
/// so `YYYY-MM-DD` is accepted next to full RFC 3339 timestamps.
/// A bare date means the last second of that day, UTC, so a coupon stays
/// usable for the whole of its final day.
pub mod lenient_datetime {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'")))
    }
}

// ── Users & auth ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub role: Option<String>,
    pub search: Option<String>,
}

impl UserQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref role) = self.role {
            params.push(("role", role.clone()));
        }
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

// ── Courses ──────────────────────────────────────────────────────────

/// The instructor field is either an id or a populated profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstructorRef {
    Id(String),
    Profile {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl InstructorRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Profile { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Profile { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryResponse {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub instructor: Option<InstructorRef>,
    #[serde(default, alias = "totalReviews")]
    pub review_count: u64,
    #[serde(default, alias = "totalStudents", alias = "enrolledCount")]
    pub student_count: u64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseQuery {
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
}

impl CourseQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref category) = self.category {
            params.push(("category", category.clone()));
        }
        if let Some(ref level) = self.level {
            params.push(("level", level.clone()));
        }
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub course: Option<CourseSummaryResponse>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub enrolled_at: Option<DateTime<Utc>>,
}

// ── Cart ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCouponResponse {
    pub code: String,
    pub discount_percentage: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    #[serde(alias = "course")]
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub applied_coupon: Option<AppliedCouponResponse>,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "user")]
    pub user_id: String,
    #[serde(default, alias = "courses")]
    pub items: Vec<CartItemResponse>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub total_discount: Decimal,
    #[serde(default)]
    pub total: Decimal,
}

// ── Coupons ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    #[serde(alias = "_id")]
    pub id: String,
    pub code: String,
    pub discount_percentage: u8,
    pub max_uses: u32,
    #[serde(default, alias = "timesUsed", alias = "currentUses")]
    pub used_count: u32,
    #[serde(deserialize_with = "lenient_datetime::deserialize")]
    pub expiry_date: DateTime<Utc>,
    #[serde(default, alias = "course")]
    pub course_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCreate {
    pub code: String,
    pub discount_percentage: u8,
    pub max_uses: u32,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

// ── Payment ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Amount in the currency's minor unit (cents).
    pub amount: i64,
    pub currency: String,
    pub course_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    #[serde(default, alias = "id")]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

// ── Admin ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStatsResponse {
    pub total_users: u64,
    pub total_students: u64,
    pub total_instructors: u64,
    pub total_courses: u64,
    pub total_enrollments: u64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPoint {
    #[serde(alias = "date", alias = "month", alias = "_id")]
    pub period: String,
    #[serde(alias = "value", alias = "total")]
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    #[serde(alias = "_id", alias = "name")]
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsResponse {
    pub user_growth: Vec<AnalyticsPoint>,
    pub enrollment_trends: Vec<AnalyticsPoint>,
    pub popular_categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBucket {
    #[serde(alias = "month", alias = "_id")]
    pub period: String,
    pub revenue: Decimal,
    #[serde(default, alias = "sales")]
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRevenue {
    #[serde(alias = "_id")]
    pub course_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub revenue: Decimal,
    #[serde(default)]
    pub sales: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevenueStatsResponse {
    pub total_revenue: Decimal,
    #[serde(alias = "monthly")]
    pub monthly_revenue: Vec<RevenueBucket>,
    pub top_courses: Vec<CourseRevenue>,
}

// ── Recommendations ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    #[serde(alias = "_id", alias = "id")]
    pub course_id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub course: Option<CourseSummaryResponse>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStatusResponse {
    pub status: String,
    #[serde(default)]
    pub last_trained_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainModelResponse {
    pub message: Option<String>,
    pub status: Option<String>,
    pub job_id: Option<String>,
}
