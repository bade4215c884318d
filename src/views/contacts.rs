//! Confirmed contacts: the other party of every accepted swap request.

use crate::models::{UserId, UserSummary};
use crate::services::avatar::{AvatarCache, ObjectUrlRegistry};
use crate::services::gateway::{MatchingGateway, PhotoGateway};
use crate::utils::filter::matches_query;
use crate::views::LoadState;
use crate::views::scope::ViewScope;

#[derive(Debug)]
pub struct ContactListView {
    me: UserId,
    contacts: Vec<UserSummary>,
    query: String,
    load_state: LoadState,
    avatars: AvatarCache,
    scope: ViewScope,
}

impl ContactListView {
    pub fn new(me: UserId, registry: ObjectUrlRegistry) -> Self {
        Self {
            me,
            contacts: Vec::new(),
            query: String::new(),
            load_state: LoadState::Idle,
            avatars: AvatarCache::new(registry),
            scope: ViewScope::new(),
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn contacts(&self) -> &[UserSummary] {
        &self.contacts
    }

    pub async fn load<G>(&mut self, gateway: &G)
    where
        G: MatchingGateway + PhotoGateway + ?Sized,
    {
        if !self.scope.is_active() {
            return;
        }
        self.load_state = LoadState::Loading;
        let Some(result) = self.scope.run(gateway.contacts(self.me)).await else {
            return;
        };
        match result {
            Ok(requests) => {
                self.contacts = requests
                    .iter()
                    .filter_map(|r| r.counterpart(self.me).cloned())
                    .collect();
                self.load_state = LoadState::Loaded;
                let ids: Vec<UserId> = self.contacts.iter().map(|c| c.id).collect();
                self.scope.run(self.avatars.load(gateway, ids)).await;
            }
            Err(e) => {
                self.load_state = LoadState::from_error(&e, "Could not load contacts.");
            }
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn filtered(&self) -> Vec<&UserSummary> {
        self.contacts
            .iter()
            .filter(|c| matches_query(&self.query, &[c.name.as_str(), c.email.as_str()]))
            .collect()
    }

    pub fn avatar(&self, id: UserId) -> &str {
        self.avatars.src(id)
    }
}
