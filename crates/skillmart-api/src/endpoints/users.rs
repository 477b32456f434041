// User management endpoints (admin dashboard)

use serde::Serialize;
use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::{ListResponse, UserCreate, UserQuery, UserResponse, UserUpdate};

impl MarketplaceClient {
    /// `GET /users?role=&search=`
    pub async fn list_users(&self, query: &UserQuery) -> Result<Vec<UserResponse>, Error> {
        let page: ListResponse<UserResponse> =
            self.get_with_params(&["users"], &query.to_params()).await?;
        Ok(page.into_vec())
    }

    /// `GET /users/:id`
    pub async fn get_user(&self, user_id: &str) -> Result<UserResponse, Error> {
        self.get(&["users", user_id]).await
    }

    /// `POST /users`
    pub async fn create_user(&self, body: &UserCreate) -> Result<UserResponse, Error> {
        debug!(email = %body.email, role = %body.role, "creating user");
        self.post(&["users"], body).await
    }

    /// `PUT /users/:id`
    pub async fn update_user(&self, user_id: &str, body: &UserUpdate) -> Result<UserResponse, Error> {
        debug!(user_id, "updating user");
        self.put(&["users", user_id], body).await
    }

    /// `DELETE /users/:id`
    pub async fn delete_user(&self, user_id: &str) -> Result<(), Error> {
        debug!(user_id, "deleting user");
        self.delete(&["users", user_id]).await
    }

    /// Activate or deactivate an account.
    ///
    /// `PATCH /users/:id/status` with `{"isActive": bool}`
    pub async fn set_user_active(&self, user_id: &str, active: bool) -> Result<UserResponse, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body {
            is_active: bool,
        }

        debug!(user_id, active, "updating user status");
        self.patch(&["users", user_id, "status"], &Body { is_active: active })
            .await
    }
}
