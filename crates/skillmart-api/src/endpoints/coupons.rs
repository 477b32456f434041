// Instructor coupon endpoints
//
// Coupons are scoped to one course: `/instructors/courses/:id/coupons`.

use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::{CouponCreate, CouponResponse, CouponUpdate, ListResponse};

impl MarketplaceClient {
    /// `GET /instructors/courses/:id/coupons`
    pub async fn list_coupons(&self, course_id: &str) -> Result<Vec<CouponResponse>, Error> {
        let page: ListResponse<CouponResponse> = self
            .get(&["instructors", "courses", course_id, "coupons"])
            .await?;
        Ok(page.into_vec())
    }

    /// `POST /instructors/courses/:id/coupons`
    pub async fn create_coupon(
        &self,
        course_id: &str,
        body: &CouponCreate,
    ) -> Result<CouponResponse, Error> {
        debug!(course_id, code = %body.code, "creating coupon");
        self.post(&["instructors", "courses", course_id, "coupons"], body)
            .await
    }

    /// `PUT /instructors/courses/:id/coupons/:couponId`
    pub async fn update_coupon(
        &self,
        course_id: &str,
        coupon_id: &str,
        body: &CouponUpdate,
    ) -> Result<CouponResponse, Error> {
        debug!(course_id, coupon_id, "updating coupon");
        self.put(
            &["instructors", "courses", course_id, "coupons", coupon_id],
            body,
        )
        .await
    }

    /// `DELETE /instructors/courses/:id/coupons/:couponId`
    pub async fn delete_coupon(&self, course_id: &str, coupon_id: &str) -> Result<(), Error> {
        debug!(course_id, coupon_id, "deleting coupon");
        self.delete(&["instructors", "courses", course_id, "coupons", coupon_id])
            .await
    }
}
