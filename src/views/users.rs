//! Listing of users available for a swap.

use chrono::Duration;
use tracing::info;

use crate::models::{NewSwapRequest, UserId, UserSummary};
use crate::services::avatar::{AvatarCache, ObjectUrlRegistry};
use crate::services::gateway::{MatchingGateway, PhotoGateway};
use crate::utils::filter::{Pager, matches_query};
use crate::views::LoadState;
use crate::views::notice::{NoticeBoard, NoticeKind};
use crate::views::scope::ViewScope;

/// Users list with search, client-side paging, and a confirm-before-send dialog
#[derive(Debug)]
pub struct UserListView {
    me: UserId,
    users: Vec<UserSummary>,
    query: String,
    pager: Pager,
    load_state: LoadState,
    avatars: AvatarCache,
    pending_confirmation: Option<UserSummary>,
    notices: NoticeBoard,
    scope: ViewScope,
}

impl UserListView {
    pub fn new(me: UserId, registry: ObjectUrlRegistry, notice_delay: Duration) -> Self {
        Self {
            me,
            users: Vec::new(),
            query: String::new(),
            pager: Pager::default(),
            load_state: LoadState::Idle,
            avatars: AvatarCache::new(registry),
            pending_confirmation: None,
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

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Fetch the full user list, then each row's photo
    pub async fn load<G>(&mut self, gateway: &G)
    where
        G: MatchingGateway + PhotoGateway + ?Sized,
    {
        if !self.scope.is_active() {
            return;
        }
        self.load_state = LoadState::Loading;
        let Some(result) = self.scope.run(gateway.list_users()).await else {
            return;
        };
        match result {
            Ok(users) => {
                self.users = users.into_iter().filter(|u| u.id != self.me).collect();
                self.load_state = LoadState::Loaded;
                let total = self.filtered().len();
                self.pager.set_page(self.pager.page(), total);

                let ids: Vec<UserId> = self.users.iter().map(|u| u.id).collect();
                self.avatars.retain(|id| ids.contains(&id));
                // Avatars load after the rows are shown; a teardown mid-way keeps what arrived
                self.scope.run(self.avatars.load(gateway, ids)).await;
            }
            Err(e) => {
                self.load_state = LoadState::from_error(
                    &e,
                    "Could not load users. Please try again later.",
                );
            }
        }
    }

    /// Update the search text; results are recomputed on every keystroke
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.pager.reset();
    }

    /// Rows matching the search, excluding the logged-in user
    pub fn filtered(&self) -> Vec<&UserSummary> {
        self.users
            .iter()
            .filter(|u| matches_query(&self.query, &[u.name.as_str()]))
            .collect()
    }

    /// Rows on the current page
    pub fn page_rows(&self) -> Vec<&UserSummary> {
        let filtered = self.filtered();
        self.pager.window(&filtered).to_vec()
    }

    pub fn page_count(&self) -> usize {
        self.pager.page_count(self.filtered().len())
    }

    pub fn set_page(&mut self, page: usize) {
        let total = self.filtered().len();
        self.pager.set_page(page, total);
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        self.pager.set_page_size(page_size)
    }

    pub fn avatar(&self, id: UserId) -> &str {
        self.avatars.src(id)
    }

    /// Open the confirmation dialog for a swap with `target`
    pub fn ask_swap(&mut self, target: UserId) -> bool {
        match self.users.iter().find(|u| u.id == target) {
            Some(user) => {
                self.pending_confirmation = Some(user.clone());
                true
            }
            None => false,
        }
    }

    /// User awaiting confirmation, if the dialog is open
    pub fn pending_confirmation(&self) -> Option<&UserSummary> {
        self.pending_confirmation.as_ref()
    }

    pub fn cancel_swap(&mut self) {
        self.pending_confirmation = None;
    }

    /// Send the confirmed request; true when the server accepted it
    pub async fn confirm_swap<G>(&mut self, gateway: &G) -> bool
    where
        G: MatchingGateway + ?Sized,
    {
        let Some(target) = self.pending_confirmation.clone() else {
            return false;
        };
        let request = NewSwapRequest {
            requester_id: self.me,
            target_id: target.id,
        };

        match self.scope.run(gateway.send_request(&request)).await {
            None => false,
            Some(Ok(())) => {
                info!(target_id = target.id, "Swap request confirmed");
                self.pending_confirmation = None;
                self.notices.post(
                    NoticeKind::Success,
                    format!("Swap request sent to {}.", target.name),
                );
                true
            }
            Some(Err(e)) => {
                if e.requires_login() {
                    self.load_state = LoadState::LoginRequired;
                }
                self.pending_confirmation = None;
                self.notices.post_error(&e);
                false
            }
        }
    }
}
