//! Pending notifications and the header badge.

use chrono::Duration;

use crate::models::{UserId, UserSummary, badge_label};
use crate::services::api_client::ApiError;
use crate::services::gateway::NotificationGateway;
use crate::views::LoadState;
use crate::views::notice::NoticeBoard;
use crate::views::scope::ViewScope;

#[derive(Debug)]
pub struct NotificationsView {
    items: Vec<UserSummary>,
    count: u32,
    load_state: LoadState,
    notices: NoticeBoard,
    scope: ViewScope,
}

impl NotificationsView {
    pub fn new(notice_delay: Duration) -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            load_state: LoadState::Idle,
            notices: NoticeBoard::new(notice_delay),
            scope: ViewScope::new(),
        }
    }

    pub fn items(&self) -> &[UserSummary] {
        &self.items
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub async fn load<G>(&mut self, gateway: &G)
    where
        G: NotificationGateway + ?Sized,
    {
        if !self.scope.is_active() {
            return;
        }
        self.load_state = LoadState::Loading;
        match self.scope.run(gateway.notifications()).await {
            None => {}
            Some(Ok(items)) => {
                self.items = items;
                self.load_state = LoadState::Loaded;
            }
            Some(Err(e)) => {
                self.load_state = LoadState::from_error(&e, "Could not load notifications.");
            }
        }
    }

    /// Refresh the pending count; the badge stays hidden on failure
    pub async fn refresh_count<G>(&mut self, gateway: &G)
    where
        G: NotificationGateway + ?Sized,
    {
        if let Some(Ok(count)) = self.scope.run(gateway.notification_count()).await {
            self.count = count.count;
        }
    }

    pub fn badge(&self) -> Option<String> {
        badge_label(self.count)
    }

    pub async fn accept<G>(&mut self, gateway: &G, id: UserId) -> bool
    where
        G: NotificationGateway + ?Sized,
    {
        let result = self.scope.run(gateway.accept_notification(id)).await;
        self.settle(id, result)
    }

    pub async fn decline<G>(&mut self, gateway: &G, id: UserId) -> bool
    where
        G: NotificationGateway + ?Sized,
    {
        let result = self.scope.run(gateway.decline_notification(id)).await;
        self.settle(id, result)
    }

    fn settle(&mut self, id: UserId, result: Option<Result<(), ApiError>>) -> bool {
        match result {
            None => false,
            Some(Ok(())) => {
                self.items.retain(|n| n.id != id);
                self.count = self.count.saturating_sub(1);
                true
            }
            Some(Err(e)) if e.requires_login() => {
                self.items.clear();
                self.count = 0;
                self.load_state = LoadState::LoginRequired;
                false
            }
            Some(Err(e)) => {
                self.notices.post_error(&e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeApi, FakeFailure};

    #[tokio::test]
    async fn test_accept_and_decline_remove_rows() {
        let api = FakeApi::with_me(1, "Me", "me@b.com");
        api.add_notification(2, "Ana");
        api.add_notification(3, "Bruno");
        api.add_notification(4, "Carla");

        let mut view = NotificationsView::new(Duration::seconds(3));
        view.load(&api).await;
        view.refresh_count(&api).await;
        assert_eq!(view.items().len(), 3);
        assert_eq!(view.badge().as_deref(), Some("3"));

        assert!(view.accept(&api, 2).await);
        assert!(view.decline(&api, 4).await);
        let ids: Vec<UserId> = view.items().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(view.badge().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_rejected_session_on_accept_requires_login() {
        let api = FakeApi::with_me(1, "Me", "me@b.com");
        api.add_notification(2, "Ana");
        api.add_notification(3, "Bruno");

        let mut view = NotificationsView::new(Duration::seconds(3));
        view.load(&api).await;
        view.refresh_count(&api).await;
        api.fail("accept_notification", FakeFailure::Unauthorized);

        assert!(!view.accept(&api, 2).await);
        assert_eq!(view.load_state(), &LoadState::LoginRequired);
        assert!(view.items().is_empty());
        assert_eq!(view.badge(), None);
    }

    #[tokio::test]
    async fn test_rejected_session_on_decline_requires_login() {
        let api = FakeApi::with_me(1, "Me", "me@b.com");
        api.add_notification(2, "Ana");

        let mut view = NotificationsView::new(Duration::seconds(3));
        view.load(&api).await;
        api.fail("decline_notification", FakeFailure::Unauthorized);

        assert!(!view.decline(&api, 2).await);
        assert_eq!(view.load_state(), &LoadState::LoginRequired);
        assert!(view.items().is_empty());
    }

    #[tokio::test]
    async fn test_other_failures_only_post_a_notice() {
        let api = FakeApi::with_me(1, "Me", "me@b.com");
        api.add_notification(2, "Ana");

        let mut view = NotificationsView::new(Duration::seconds(3));
        view.load(&api).await;
        api.fail("accept_notification", FakeFailure::Timeout);

        assert!(!view.accept(&api, 2).await);
        assert_eq!(view.load_state(), &LoadState::Loaded);
        assert_eq!(view.items().len(), 1);
        assert!(view.notices().current().is_some());
    }
}
