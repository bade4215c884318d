//! Pending swap requests addressed to the logged-in user.

use chrono::Duration;
use tracing::info;

use crate::models::{RequestId, RequestStatus, SwapRequest, UserId};
use crate::services::avatar::{AvatarCache, ObjectUrlRegistry};
use crate::services::gateway::{MatchingGateway, PhotoGateway};
use crate::utils::filter::matches_query;
use crate::views::LoadState;
use crate::views::notice::{NoticeBoard, NoticeKind};
use crate::views::scope::ViewScope;

#[derive(Debug)]
pub struct RequestListView {
    me: UserId,
    requests: Vec<SwapRequest>,
    query: String,
    selected: Option<RequestId>,
    load_state: LoadState,
    avatars: AvatarCache,
    notices: NoticeBoard,
    scope: ViewScope,
}

impl RequestListView {
    pub fn new(me: UserId, registry: ObjectUrlRegistry, notice_delay: Duration) -> Self {
        Self {
            me,
            requests: Vec::new(),
            query: String::new(),
            selected: None,
            load_state: LoadState::Idle,
            avatars: AvatarCache::new(registry),
            notices: NoticeBoard::new(notice_delay),
            scope: ViewScope::new(),
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn requests(&self) -> &[SwapRequest] {
        &self.requests
    }

    pub async fn load<G>(&mut self, gateway: &G)
    where
        G: MatchingGateway + PhotoGateway + ?Sized,
    {
        if !self.scope.is_active() {
            return;
        }
        self.load_state = LoadState::Loading;
        let Some(result) = self.scope.run(gateway.pending_requests(self.me)).await else {
            return;
        };
        match result {
            Ok(requests) => {
                self.requests = requests;
                self.load_state = LoadState::Loaded;
                let ids: Vec<UserId> = self.requests.iter().map(|r| r.requester.id).collect();
                self.scope.run(self.avatars.load(gateway, ids)).await;
            }
            Err(e) => {
                self.load_state =
                    LoadState::from_error(&e, "Could not load the requests.");
            }
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Requests whose requester name or institution matches the search
    pub fn filtered(&self) -> Vec<&SwapRequest> {
        self.requests
            .iter()
            .filter(|r| {
                let institution = r.requester.institution_name().unwrap_or_default();
                matches_query(&self.query, &[r.requester.name.as_str(), institution])
            })
            .collect()
    }

    pub fn avatar(&self, requester: UserId) -> &str {
        self.avatars.src(requester)
    }

    /// Open the detail dialog for a request
    pub fn select(&mut self, id: RequestId) -> bool {
        if self.requests.iter().any(|r| r.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&SwapRequest> {
        let id = self.selected?;
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn close_dialog(&mut self) {
        self.selected = None;
    }

    pub async fn accept<G>(&mut self, gateway: &G, id: RequestId) -> bool
    where
        G: MatchingGateway + ?Sized,
    {
        self.resolve(gateway, id, RequestStatus::Accepted).await
    }

    pub async fn reject<G>(&mut self, gateway: &G, id: RequestId) -> bool
    where
        G: MatchingGateway + ?Sized,
    {
        self.resolve(gateway, id, RequestStatus::Rejected).await
    }

    /// Update status server-side, then drop exactly that row
    async fn resolve<G>(&mut self, gateway: &G, id: RequestId, status: RequestStatus) -> bool
    where
        G: MatchingGateway + ?Sized,
    {
        if !self.requests.iter().any(|r| r.id == id) {
            return false;
        }
        match self.scope.run(gateway.resolve_request(id, status)).await {
            None => false,
            Some(Ok(())) => {
                info!(request_id = id, status = ?status, "Request resolved");
                self.requests.retain(|r| r.id != id);
                if self.selected == Some(id) {
                    self.selected = None;
                }
                let remaining: Vec<UserId> = self.requests.iter().map(|r| r.requester.id).collect();
                self.avatars.retain(|user| remaining.contains(&user));

                let text = match status {
                    RequestStatus::Accepted => "Request accepted.",
                    _ => "Request rejected.",
                };
                self.notices.post(NoticeKind::Success, text);
                true
            }
            Some(Err(e)) => {
                if e.requires_login() {
                    self.load_state = LoadState::LoginRequired;
                }
                self.notices.post_error(&e);
                false
            }
        }
    }
}
