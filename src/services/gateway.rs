//! Gateway traits between the views and the remote API.
//!
//! Views only talk to these traits. [`ApiClient`](super::api_client::ApiClient)
//! implements all of them over HTTP; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::models::{
    Institution, LoginRequest, LoginResponse, NewSwapRequest, NotificationCount, RegisterRequest,
    RequestId, RequestStatus, SwapRequest, User, UserId, UserSummary, UserUpdate,
};
use crate::services::api_client::ApiError;

/// Binary photo as served by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Image picked by the user for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Login and registration
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn register(&self, registration: &RegisterRequest) -> Result<UserSummary, ApiError>;
}

/// The logged-in user's own record and reference data for editing it
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    async fn current_user(&self) -> Result<User, ApiError>;
    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), ApiError>;
    async fn institutions(&self) -> Result<Vec<Institution>, ApiError>;
}

/// Profile photos
#[async_trait]
pub trait PhotoGateway: Send + Sync {
    /// `Ok(None)` when the user has no photo (404 or empty body)
    async fn fetch_photo(&self, id: UserId) -> Result<Option<Photo>, ApiError>;
    async fn upload_photo(&self, id: UserId, image: &ImageUpload) -> Result<(), ApiError>;
}

/// Candidate users, swap requests, and confirmed contacts
#[async_trait]
pub trait MatchingGateway: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserSummary>, ApiError>;
    async fn send_request(&self, request: &NewSwapRequest) -> Result<(), ApiError>;
    /// Pending requests addressed to `user`
    async fn pending_requests(&self, user: UserId) -> Result<Vec<SwapRequest>, ApiError>;
    async fn resolve_request(&self, id: RequestId, status: RequestStatus) -> Result<(), ApiError>;
    /// Accepted requests `user` is a party to
    async fn contacts(&self, user: UserId) -> Result<Vec<SwapRequest>, ApiError>;
}

/// Pending notification workflow
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notifications(&self) -> Result<Vec<UserSummary>, ApiError>;
    async fn accept_notification(&self, id: UserId) -> Result<(), ApiError>;
    async fn decline_notification(&self, id: UserId) -> Result<(), ApiError>;
    async fn notification_count(&self) -> Result<NotificationCount, ApiError>;
}
