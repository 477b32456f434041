// Cart endpoints
//
// Every mutation returns the full cart as the server computed it.
// Totals are never derived on this side.

use serde::Serialize;
use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::CartResponse;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CourseBody<'a> {
    course_id: &'a str,
}

impl MarketplaceClient {
    /// `GET /cart`
    pub async fn get_cart(&self) -> Result<CartResponse, Error> {
        self.get(&["cart"]).await
    }

    /// `POST /cart/add` with `{"courseId": "..."}`
    pub async fn add_to_cart(&self, course_id: &str) -> Result<CartResponse, Error> {
        debug!(course_id, "adding course to cart");
        self.post(&["cart", "add"], &CourseBody { course_id }).await
    }

    /// `POST /cart/remove` with `{"courseId": "..."}`
    pub async fn remove_from_cart(&self, course_id: &str) -> Result<CartResponse, Error> {
        debug!(course_id, "removing course from cart");
        self.post(&["cart", "remove"], &CourseBody { course_id }).await
    }

    /// `POST /cart/apply-coupon` with `{"courseId": "...", "couponCode": "..."}`
    pub async fn apply_coupon(
        &self,
        course_id: &str,
        coupon_code: &str,
    ) -> Result<CartResponse, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            course_id: &'a str,
            coupon_code: &'a str,
        }

        debug!(course_id, coupon_code, "applying coupon");
        self.post(
            &["cart", "apply-coupon"],
            &Body {
                course_id,
                coupon_code,
            },
        )
        .await
    }

    /// Empty the cart.
    ///
    /// `DELETE /cart`
    pub async fn clear_cart(&self) -> Result<(), Error> {
        debug!("clearing cart");
        self.delete(&["cart"]).await
    }
}
