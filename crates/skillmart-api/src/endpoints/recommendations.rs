// Recommendation service endpoints
//
// The ranking model lives behind the backend; this is display plumbing.

use serde_json::json;
use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::{
    ListResponse, RecommendationResponse, TrainModelResponse, TrainingStatusResponse,
};

impl MarketplaceClient {
    /// `GET /recommendations/:userId`
    pub async fn get_recommendations(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecommendationResponse>, Error> {
        let page: ListResponse<RecommendationResponse> =
            self.get(&["recommendations", user_id]).await?;
        Ok(page.into_vec())
    }

    /// `GET /courses/:id/similar`
    pub async fn get_similar_courses(
        &self,
        course_id: &str,
    ) -> Result<Vec<RecommendationResponse>, Error> {
        let page: ListResponse<RecommendationResponse> =
            self.get(&["courses", course_id, "similar"]).await?;
        Ok(page.into_vec())
    }

    /// `GET /model/training-status`
    pub async fn get_training_status(&self) -> Result<TrainingStatusResponse, Error> {
        self.get(&["model", "training-status"]).await
    }

    /// Kick off a training run. Returns as soon as the job is accepted.
    ///
    /// `POST /train-model`
    pub async fn train_model(&self) -> Result<TrainModelResponse, Error> {
        debug!("requesting model training");
        self.post(&["train-model"], &json!({})).await
    }
}
