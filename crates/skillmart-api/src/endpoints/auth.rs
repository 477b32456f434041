// Auth endpoints
//
// Token issuance and the profile of the token holder. The token itself
// is attached by the caller when it builds the next client.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::{AuthResponse, UserCreate, UserResponse};

impl MarketplaceClient {
    /// Exchange email + password for a bearer token.
    ///
    /// `POST /auth/login`
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthResponse, Error> {
        debug!(email, "logging in");
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        self.post(&["auth", "login"], &body).await.map_err(|e| match e {
            Error::InvalidToken => Error::Authentication {
                message: "invalid email or password".into(),
            },
            other => other,
        })
    }

    /// Create a student or instructor account.
    ///
    /// `POST /auth/register`
    pub async fn register(&self, body: &UserCreate) -> Result<AuthResponse, Error> {
        debug!(email = %body.email, role = %body.role, "registering account");
        self.post(&["auth", "register"], body).await
    }

    /// Profile of the token holder.
    ///
    /// `GET /auth/me`
    pub async fn me(&self) -> Result<UserResponse, Error> {
        self.get(&["auth", "me"]).await
    }
}
