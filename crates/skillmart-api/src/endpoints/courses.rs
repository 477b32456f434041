// Course catalog endpoints

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::{CourseQuery, CourseSummaryResponse, EnrollmentResponse, ListResponse};

impl MarketplaceClient {
    /// `GET /courses?category=&level=&search=`
    pub async fn list_courses(
        &self,
        query: &CourseQuery,
    ) -> Result<Vec<CourseSummaryResponse>, Error> {
        let page: ListResponse<CourseSummaryResponse> =
            self.get_with_params(&["courses"], &query.to_params()).await?;
        Ok(page.into_vec())
    }

    /// `GET /courses/:id`
    pub async fn get_course(&self, course_id: &str) -> Result<CourseSummaryResponse, Error> {
        self.get(&["courses", course_id]).await
    }

    /// Courses owned by the authenticated instructor.
    ///
    /// `GET /instructors/courses`
    pub async fn list_instructor_courses(&self) -> Result<Vec<CourseSummaryResponse>, Error> {
        let page: ListResponse<CourseSummaryResponse> =
            self.get(&["instructors", "courses"]).await?;
        Ok(page.into_vec())
    }

    /// Courses the authenticated student is enrolled in.
    ///
    /// `GET /enrollments`
    pub async fn list_enrollments(&self) -> Result<Vec<EnrollmentResponse>, Error> {
        let page: ListResponse<EnrollmentResponse> = self.get(&["enrollments"]).await?;
        Ok(page.into_vec())
    }
}
