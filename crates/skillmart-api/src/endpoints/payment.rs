// Payment endpoint
//
// Only the intent is created here. Card confirmation happens between the
// payment provider and whoever holds the client secret.

use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::{PaymentIntentRequest, PaymentIntentResponse};

impl MarketplaceClient {
    /// `POST /payment-intent`
    pub async fn create_payment_intent(
        &self,
        body: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, Error> {
        debug!(
            amount = body.amount,
            currency = %body.currency,
            courses = body.course_ids.len(),
            "creating payment intent"
        );
        self.post(&["payment-intent"], body).await
    }
}
