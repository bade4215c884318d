//! User listing, swap request, contact, and notification calls.

use async_trait::async_trait;
use tracing::info;

use crate::models::{
    NewSwapRequest, NotificationCount, RequestId, RequestStatus, StatusUpdate, SwapRequest,
    UserId, UserSummary,
};
use crate::services::api_client::{ApiClient, ApiError, Body, Call};
use crate::services::gateway::{MatchingGateway, NotificationGateway};

#[async_trait]
impl MatchingGateway for ApiClient {
    async fn list_users(&self) -> Result<Vec<UserSummary>, ApiError> {
        self.fetch_json(Call::get("/usuarios", "/usuarios"), Body::Empty)
            .await
    }

    async fn send_request(&self, request: &NewSwapRequest) -> Result<(), ApiError> {
        self.send(Call::post("/solicitacoes", "/solicitacoes"), Body::json(request)?)
            .await?;
        info!(
            requester_id = request.requester_id,
            target_id = request.target_id,
            "Swap request sent"
        );
        Ok(())
    }

    async fn pending_requests(&self, user: UserId) -> Result<Vec<SwapRequest>, ApiError> {
        let call = Call::get("/solicitacoes/{userId}", format!("/solicitacoes/{user}"));
        self.fetch_json(call, Body::Empty).await
    }

    async fn resolve_request(&self, id: RequestId, status: RequestStatus) -> Result<(), ApiError> {
        let call = Call::put("/solicitacoes/{id}", format!("/solicitacoes/{id}"));
        self.send(call, Body::json(&StatusUpdate { status })?).await?;
        info!(request_id = id, status = ?status, "Swap request resolved");
        Ok(())
    }

    async fn contacts(&self, user: UserId) -> Result<Vec<SwapRequest>, ApiError> {
        let call = Call::get(
            "/solicitacoes/contatos/{userId}",
            format!("/solicitacoes/contatos/{user}"),
        );
        self.fetch_json(call, Body::Empty).await
    }
}

#[async_trait]
impl NotificationGateway for ApiClient {
    async fn notifications(&self) -> Result<Vec<UserSummary>, ApiError> {
        self.fetch_json(Call::get("/notificacoes", "/notificacoes"), Body::Empty)
            .await
    }

    async fn accept_notification(&self, id: UserId) -> Result<(), ApiError> {
        let call = Call::post("/notificacoes/{id}/aceitar", format!("/notificacoes/{id}/aceitar"));
        self.send(call, Body::json(&serde_json::json!({}))?).await
    }

    async fn decline_notification(&self, id: UserId) -> Result<(), ApiError> {
        let call = Call::post("/notificacoes/{id}/recusar", format!("/notificacoes/{id}/recusar"));
        self.send(call, Body::json(&serde_json::json!({}))?).await
    }

    async fn notification_count(&self) -> Result<NotificationCount, ApiError> {
        self.fetch_json(Call::get("/notificacoes/count", "/notificacoes/count"), Body::Empty)
            .await
    }
}
