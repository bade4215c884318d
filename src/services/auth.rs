//! Login and registration calls.

use async_trait::async_trait;
use tracing::info;

use crate::models::{LoginRequest, LoginResponse, RegisterRequest, UserSummary};
use crate::services::api_client::{ApiClient, ApiError, Body, Call};
use crate::services::gateway::AuthGateway;

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let call = Call::post("/autorizacoes/login", "/autorizacoes/login").anonymous();
        let response: LoginResponse = self.fetch_json(call, Body::json(credentials)?).await?;
        info!(user_id = response.id, "Login accepted");
        Ok(response)
    }

    async fn register(&self, registration: &RegisterRequest) -> Result<UserSummary, ApiError> {
        let call = Call::post("/autorizacoes/register", "/autorizacoes/register").anonymous();
        let created: UserSummary = self.fetch_json(call, Body::json(registration)?).await?;
        info!(user_id = created.id, "Registration accepted");
        Ok(created)
    }
}
