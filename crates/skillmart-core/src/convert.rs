// ── API-to-domain type conversions ──
//
// Bridges raw `skillmart_api::types` bodies into `skillmart_core::model`
// types. Unknown enum strings become `Other`/`Unknown` instead of failing;
// blank optional strings are dropped.

use rust_decimal::Decimal;
use skillmart_api::types::{
    AdminStatsResponse, AnalyticsPoint, AnalyticsResponse, CartItemResponse, CartResponse, CouponResponse,
    CourseSummaryResponse, EnrollmentResponse, RecommendationResponse, RevenueStatsResponse,
    TrainingStatusResponse, UserResponse,
};

use crate::model::{
    AdminStats, Analytics, AppliedCoupon, Cart, CartLine, CartTotals, CategoryCount, Coupon,
    Course, CourseLevel, CourseRevenue, Enrollment, EntityId, ModelState, Recommendation,
    RevenuePoint, RevenueStats, Role, RoleProfile, TrainingStatus, TrendPoint, User,
};

// ── Helpers ────────────────────────────────────────────────────────

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn non_blank_id(raw: Option<String>) -> Option<EntityId> {
    non_blank(raw).map(EntityId::from)
}

// ── Catalog ────────────────────────────────────────────────────────

impl From<CourseSummaryResponse> for Course {
    fn from(c: CourseSummaryResponse) -> Self {
        let (instructor_id, instructor_name) = match c.instructor {
            Some(ref r) => (
                Some(EntityId::from(r.id())),
                r.name().map(str::to_owned),
            ),
            None => (None, None),
        };
        Self {
            id: EntityId::from(c.id),
            title: c.title,
            thumbnail: non_blank(c.thumbnail),
            category: non_blank(c.category),
            level: c
                .level
                .as_deref()
                .map_or(CourseLevel::Other, CourseLevel::parse_lenient),
            price: c.price,
            instructor_id,
            instructor_name,
            review_count: c.review_count,
            student_count: c.student_count,
            rating: c.rating,
            description: non_blank(c.description),
        }
    }
}

impl From<EnrollmentResponse> for Enrollment {
    fn from(e: EnrollmentResponse) -> Self {
        Self {
            id: EntityId::from(e.id),
            course_id: non_blank_id(e.course_id),
            course: e.course.map(Course::from),
            progress: e.progress.clamp(0.0, 100.0),
            enrolled_at: e.enrolled_at,
        }
    }
}

// ── Cart ───────────────────────────────────────────────────────────

impl From<CartItemResponse> for CartLine {
    fn from(item: CartItemResponse) -> Self {
        Self {
            course_id: EntityId::from(item.course_id),
            title: item.title,
            thumbnail: non_blank(item.thumbnail),
            price: item.price,
            applied_coupon: item.applied_coupon.map(|c| AppliedCoupon {
                code: c.code,
                discount_percentage: c.discount_percentage,
            }),
            discounted_price: item.discounted_price,
        }
    }
}

impl From<CartResponse> for Cart {
    fn from(cart: CartResponse) -> Self {
        Self {
            id: non_blank_id(cart.id),
            owner_id: non_blank_id(Some(cart.user_id)),
            lines: cart.items.into_iter().map(CartLine::from).collect(),
            totals: CartTotals {
                subtotal: cart.subtotal,
                total_discount: cart.total_discount,
                total: cart.total,
            },
        }
    }
}

// ── Coupons ────────────────────────────────────────────────────────

impl From<CouponResponse> for Coupon {
    fn from(c: CouponResponse) -> Self {
        Self {
            id: EntityId::from(c.id),
            code: c.code,
            discount_percentage: c.discount_percentage,
            max_uses: c.max_uses,
            used_count: c.used_count,
            expiry: c.expiry_date,
            course_id: non_blank_id(c.course_id),
            created_at: c.created_at,
        }
    }
}

// ── Users ──────────────────────────────────────────────────────────

impl From<UserResponse> for User {
    fn from(u: UserResponse) -> Self {
        let role: Role = u.role.parse().unwrap_or(Role::Unknown);
        let profile = match role {
            Role::Student => RoleProfile::Student {
                education: non_blank(u.education),
            },
            Role::Instructor => RoleProfile::Instructor {
                expertise: u
                    .expertise
                    .into_iter()
                    .filter(|e| !e.trim().is_empty())
                    .collect(),
                bio: non_blank(u.bio),
            },
            Role::Admin => RoleProfile::Admin,
            Role::Unknown => RoleProfile::Unknown { raw: u.role },
        };
        Self {
            id: EntityId::from(u.id),
            name: u.name,
            email: u.email,
            active: u.is_active,
            profile,
            avatar: non_blank(u.avatar),
            created_at: u.created_at,
        }
    }
}

// ── Admin ──────────────────────────────────────────────────────────

impl From<AdminStatsResponse> for AdminStats {
    fn from(s: AdminStatsResponse) -> Self {
        Self {
            total_users: s.total_users,
            total_students: s.total_students,
            total_instructors: s.total_instructors,
            total_courses: s.total_courses,
            total_enrollments: s.total_enrollments,
            total_revenue: s.total_revenue,
        }
    }
}

impl From<AnalyticsResponse> for Analytics {
    fn from(a: AnalyticsResponse) -> Self {
        let trend = |points: Vec<AnalyticsPoint>| -> Vec<TrendPoint> {
            points
                .into_iter()
                .map(|p| TrendPoint {
                    period: p.period,
                    count: p.count,
                })
                .collect()
        };
        Self {
            user_growth: trend(a.user_growth),
            enrollment_trends: trend(a.enrollment_trends),
            popular_categories: a
                .popular_categories
                .into_iter()
                .map(|c| CategoryCount {
                    category: c.category,
                    count: c.count,
                })
                .collect(),
        }
    }
}

impl From<RevenueStatsResponse> for RevenueStats {
    fn from(r: RevenueStatsResponse) -> Self {
        // Older backends only send the monthly buckets.
        let total_revenue = if r.total_revenue.is_zero() {
            r.monthly_revenue.iter().map(|b| b.revenue).sum::<Decimal>()
        } else {
            r.total_revenue
        };
        Self {
            total_revenue,
            monthly: r
                .monthly_revenue
                .into_iter()
                .map(|b| RevenuePoint {
                    period: b.period,
                    revenue: b.revenue,
                    orders: b.orders,
                })
                .collect(),
            top_courses: r
                .top_courses
                .into_iter()
                .map(|c| CourseRevenue {
                    course_id: EntityId::from(c.course_id),
                    title: non_blank(c.title),
                    revenue: c.revenue,
                    sales: c.sales,
                })
                .collect(),
        }
    }
}

// ── Recommendations ────────────────────────────────────────────────

impl From<RecommendationResponse> for Recommendation {
    fn from(r: RecommendationResponse) -> Self {
        Self {
            course_id: EntityId::from(r.course_id),
            title: non_blank(r.title),
            score: r.score,
            reason: non_blank(r.reason),
            course: r.course.map(Course::from),
        }
    }
}

impl From<TrainingStatusResponse> for TrainingStatus {
    fn from(t: TrainingStatusResponse) -> Self {
        Self {
            state: ModelState::from_status(&t.status),
            last_trained_at: t.last_trained_at,
            progress: t.progress,
            message: non_blank(t.message),
            model_version: non_blank(t.model_version),
        }
    }
}
