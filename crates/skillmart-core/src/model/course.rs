// ── Catalog types ──

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
    #[strum(to_string = "all-levels", serialize = "all")]
    AllLevels,
    Other,
}

impl CourseLevel {
    /// Lenient parse: `"All Levels"`, `"all_levels"` and `"ALL-LEVELS"` are
    /// the same level. Anything unrecognized is `Other`.
    pub fn parse_lenient(raw: &str) -> Self {
        let normalized = raw.trim().replace([' ', '_'], "-");
        normalized.parse().unwrap_or(Self::Other)
    }
}

/// Read-only course summary as listed in the catalog and the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: EntityId,
    pub title: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub level: CourseLevel,
    pub price: Decimal,
    pub instructor_id: Option<EntityId>,
    pub instructor_name: Option<String>,
    pub review_count: u64,
    pub student_count: u64,
    pub rating: Option<f64>,
    pub description: Option<String>,
}

impl Course {
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EntityId,
    pub course_id: Option<EntityId>,
    pub course: Option<Course>,
    /// Completion in percent, 0..=100.
    pub progress: f64,
    pub enrolled_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// The enrolled course id, whether the backend populated the course or not.
    pub fn course_ref(&self) -> Option<&EntityId> {
        self.course_id
            .as_ref()
            .or_else(|| self.course.as_ref().map(|c| &c.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_is_lenient() {
        assert_eq!(CourseLevel::parse_lenient("Beginner"), CourseLevel::Beginner);
        assert_eq!(CourseLevel::parse_lenient("All Levels"), CourseLevel::AllLevels);
        assert_eq!(CourseLevel::parse_lenient("all_levels"), CourseLevel::AllLevels);
        assert_eq!(CourseLevel::parse_lenient("expert"), CourseLevel::Other);
        assert_eq!(CourseLevel::AllLevels.to_string(), "all-levels");
    }
}
