//! In-memory gateway used by unit tests.
//!
//! `FakeApi` implements every gateway trait over a small mutable state and
//! mirrors the real client's contract: authenticated calls without a session
//! token fail before they are counted as network calls.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::models::{
    Institution, InstitutionRef, LoginRequest, LoginResponse, NewSwapRequest, NotificationCount,
    RegisterRequest, RequestId, RequestStatus, SwapRequest, User, UserId, UserSummary, UserUpdate,
};
use crate::services::api_client::ApiError;
use crate::services::gateway::{
    AuthGateway, ImageUpload, MatchingGateway, NotificationGateway, Photo, PhotoGateway,
    ProfileGateway,
};
use crate::services::session::Session;

/// Failure injected into every call of one gateway operation
#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
    Timeout,
    Rejected(&'static str),
    Unauthorized,
}

impl FakeFailure {
    fn to_error(self) -> ApiError {
        match self {
            FakeFailure::Timeout => ApiError::Timeout,
            FakeFailure::Rejected(message) => ApiError::Rejected {
                status: 400,
                message: message.to_string(),
            },
            FakeFailure::Unauthorized => ApiError::Unauthorized { message: None },
        }
    }
}

#[derive(Default)]
struct FakeState {
    me: Option<User>,
    users: Vec<UserSummary>,
    institutions: Vec<Institution>,
    photos: HashMap<UserId, Vec<u8>>,
    requests: Vec<SwapRequest>,
    notifications: Vec<UserSummary>,
    logins: Vec<(String, String, LoginResponse)>,
    failures: HashMap<&'static str, FakeFailure>,
    calls: Vec<&'static str>,
    registered: Vec<RegisterRequest>,
    updates: Vec<(UserId, UserUpdate)>,
    uploads: Vec<(UserId, ImageUpload)>,
    sent: Vec<NewSwapRequest>,
    resolved: Vec<(RequestId, RequestStatus)>,
}

pub struct FakeApi {
    session: Session,
    state: Mutex<FakeState>,
}

pub fn summary(id: UserId, name: &str) -> UserSummary {
    UserSummary {
        id,
        name: name.to_string(),
        email: format!("{}@escola.br", name.to_lowercase().replace(' ', ".")),
        role: None,
        photo_url: None,
        institution: Some(InstitutionRef {
            name: format!("Escola {id}"),
        }),
    }
}

impl FakeApi {
    /// Logged-in fake with no current user record
    pub fn new() -> Self {
        let session = Session::in_memory();
        session
            .establish("fake-token")
            .expect("memory store never fails");
        Self {
            session,
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Logged-in fake whose current user is `id`
    pub fn with_me(id: UserId, name: &str, email: &str) -> Self {
        let api = Self::new();
        {
            let mut state = api.lock();
            state.me = Some(User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                role: None,
                current_institution: None,
                desired_institutions: Vec::new(),
                accepts_nearby: false,
                photo_url: None,
                created_at: None,
            });
            let mut me = summary(id, name);
            me.email = email.to_string();
            state.users.push(me);
        }
        api
    }

    pub fn session(&self) -> Session {
        self.session.clone()
    }

    pub fn logged_out(&self) {
        self.session.logout();
    }

    pub fn allow_login(&self, email: &str, password: &str, id: UserId, name: &str, token: &str) {
        self.lock().logins.push((
            email.to_string(),
            password.to_string(),
            LoginResponse {
                access_token: token.to_string(),
                id,
                name: name.to_string(),
            },
        ));
    }

    pub fn add_user(&self, id: UserId, name: &str) {
        self.lock().users.push(summary(id, name));
    }

    pub fn set_photo(&self, id: UserId, bytes: Vec<u8>) {
        self.lock().photos.insert(id, bytes);
    }

    pub fn fail_photos(&self) {
        self.fail("fetch_photo", FakeFailure::Timeout);
    }

    pub fn set_institutions(&self, institutions: &[(i64, &str)]) {
        self.lock().institutions = institutions
            .iter()
            .map(|(id, name)| Institution {
                id: *id,
                name: name.to_string(),
            })
            .collect();
    }

    pub fn add_request(&self, id: RequestId, requester: UserId, target: UserId) {
        let mut state = self.lock();
        let find = |id: UserId| {
            state
                .users
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .unwrap_or_else(|| summary(id, &format!("User {id}")))
        };
        let request = SwapRequest {
            id,
            requester: find(requester),
            target: Some(find(target)),
            requester_id: Some(requester),
            target_id: Some(target),
            status: RequestStatus::Pending,
        };
        state.requests.push(request);
    }

    pub fn set_status(&self, id: RequestId, status: RequestStatus) {
        if let Some(request) = self.lock().requests.iter_mut().find(|r| r.id == id) {
            request.status = status;
        }
    }

    pub fn add_notification(&self, id: UserId, name: &str) {
        self.lock().notifications.push(summary(id, name));
    }

    pub fn fail(&self, operation: &'static str, failure: FakeFailure) {
        self.lock().failures.insert(operation, failure);
    }

    /// Calls that would have reached the network
    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn registered(&self) -> Vec<RegisterRequest> {
        self.lock().registered.clone()
    }

    pub fn updates(&self) -> Vec<(UserId, UserUpdate)> {
        self.lock().updates.clone()
    }

    pub fn uploads(&self) -> Vec<(UserId, ImageUpload)> {
        self.lock().uploads.clone()
    }

    pub fn sent_requests(&self) -> Vec<NewSwapRequest> {
        self.lock().sent.clone()
    }

    pub fn resolved(&self) -> Vec<(RequestId, RequestStatus)> {
        self.lock().resolved.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Token check, call accounting, and failure injection for one operation
    fn enter(
        &self,
        operation: &'static str,
        authenticated: bool,
    ) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        if authenticated && !self.session.is_authenticated() {
            return Err(ApiError::Unauthenticated);
        }
        let mut state = self.lock();
        state.calls.push(operation);
        if let Some(failure) = state.failures.get(operation).copied() {
            return Err(failure.to_error());
        }
        Ok(state)
    }
}

#[async_trait]
impl AuthGateway for FakeApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let state = self.enter("login", false)?;
        state
            .logins
            .iter()
            .find(|(email, password, _)| {
                *email == credentials.email && *password == credentials.password
            })
            .map(|(_, _, response)| response.clone())
            .ok_or(ApiError::Unauthorized {
                message: Some("Invalid credentials".to_string()),
            })
    }

    async fn register(&self, registration: &RegisterRequest) -> Result<UserSummary, ApiError> {
        let mut state = self.enter("register", false)?;
        let id = state.users.len() as UserId + 100;
        state.registered.push(registration.clone());
        Ok(summary(id, &registration.name))
    }
}

#[async_trait]
impl ProfileGateway for FakeApi {
    async fn current_user(&self) -> Result<User, ApiError> {
        let state = self.enter("current_user", true)?;
        state.me.clone().ok_or(ApiError::Status(404))
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), ApiError> {
        let mut state = self.enter("update_user", true)?;
        state.updates.push((id, update.clone()));
        if let Some(me) = state.me.as_mut().filter(|me| me.id == id) {
            if let Some(name) = &update.name {
                me.name = name.clone();
            }
            if let Some(email) = &update.email {
                me.email = email.clone();
            }
            if let Some(role) = &update.role {
                me.role = Some(role.clone());
            }
            if update.current_institution.is_some() {
                me.current_institution = update.current_institution;
            }
            if let Some(desired) = &update.desired_institutions {
                me.desired_institutions = desired.clone();
            }
            if let Some(accepts) = update.accepts_nearby {
                me.accepts_nearby = accepts;
            }
        }
        Ok(())
    }

    async fn institutions(&self) -> Result<Vec<Institution>, ApiError> {
        let state = self.enter("institutions", true)?;
        Ok(state.institutions.clone())
    }
}

#[async_trait]
impl PhotoGateway for FakeApi {
    async fn fetch_photo(&self, id: UserId) -> Result<Option<Photo>, ApiError> {
        let state = self.enter("fetch_photo", true)?;
        Ok(state
            .photos
            .get(&id)
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| Photo {
                bytes: bytes.clone(),
                content_type: "image/png".to_string(),
            }))
    }

    async fn upload_photo(&self, id: UserId, image: &ImageUpload) -> Result<(), ApiError> {
        let mut state = self.enter("upload_photo", true)?;
        state.uploads.push((id, image.clone()));
        state.photos.insert(id, image.bytes.clone());
        Ok(())
    }
}

#[async_trait]
impl MatchingGateway for FakeApi {
    async fn list_users(&self) -> Result<Vec<UserSummary>, ApiError> {
        let state = self.enter("list_users", true)?;
        Ok(state.users.clone())
    }

    async fn send_request(&self, request: &NewSwapRequest) -> Result<(), ApiError> {
        let mut state = self.enter("send_request", true)?;
        state.sent.push(*request);
        Ok(())
    }

    async fn pending_requests(&self, user: UserId) -> Result<Vec<SwapRequest>, ApiError> {
        let state = self.enter("pending_requests", true)?;
        Ok(state
            .requests
            .iter()
            .filter(|r| r.target_id == Some(user) && r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn resolve_request(&self, id: RequestId, status: RequestStatus) -> Result<(), ApiError> {
        let mut state = self.enter("resolve_request", true)?;
        state.resolved.push((id, status));
        match state.requests.iter_mut().find(|r| r.id == id) {
            Some(request) => {
                request.status = status;
                Ok(())
            }
            None => Err(ApiError::Status(404)),
        }
    }

    async fn contacts(&self, user: UserId) -> Result<Vec<SwapRequest>, ApiError> {
        let state = self.enter("contacts", true)?;
        Ok(state
            .requests
            .iter()
            .filter(|r| {
                r.status == RequestStatus::Accepted
                    && (r.requester_id == Some(user) || r.target_id == Some(user))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationGateway for FakeApi {
    async fn notifications(&self) -> Result<Vec<UserSummary>, ApiError> {
        let state = self.enter("notifications", true)?;
        Ok(state.notifications.clone())
    }

    async fn accept_notification(&self, id: UserId) -> Result<(), ApiError> {
        let mut state = self.enter("accept_notification", true)?;
        state.notifications.retain(|n| n.id != id);
        Ok(())
    }

    async fn decline_notification(&self, id: UserId) -> Result<(), ApiError> {
        let mut state = self.enter("decline_notification", true)?;
        state.notifications.retain(|n| n.id != id);
        Ok(())
    }

    async fn notification_count(&self) -> Result<NotificationCount, ApiError> {
        let state = self.enter("notification_count", true)?;
        Ok(NotificationCount {
            count: state.notifications.len() as u32,
        })
    }
}
