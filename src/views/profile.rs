//! Profile screen of the logged-in user.
//!
//! Owns the user record, the profile photo, and two independent overlays: the
//! profile editor (name, e-mail, password, photo) and the placement editor
//! (role, current institution, desired institutions, proximity preference).
//!
//! ```text
//! Loading ──load──► Ready ──logout──► LoggedOut
//!    │                 │
//!    │          session rejected
//!    │                 ▼
//!    └──no session──► Guest
//! ```

use chrono::Duration;
use tracing::{debug, info};

use crate::models::{Institution, InstitutionId, User, UserUpdate};
use crate::services::api_client::ApiError;
use crate::services::avatar::{Avatar, ObjectUrlRegistry, resolve_avatar};
use crate::services::gateway::{ImageUpload, PhotoGateway, ProfileGateway};
use crate::services::session::Session;
use crate::utils::validation::{MIN_PASSWORD_LEN, is_valid_password};
use crate::views::notice::{NoticeBoard, NoticeKind};
use crate::views::scope::ViewScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileState {
    Loading,
    /// No usable session; shown with placeholder data
    Guest,
    Ready,
    /// Terminal; the caller navigates back to the entry screen
    LoggedOut,
}

/// Editable identity fields shown on the profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub email: String,
}

impl From<&User> for ProfileFields {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Open profile editor: the snapshot taken on open plus write-only inputs
#[derive(Debug, Clone, Default)]
pub struct ProfileEditor {
    original: ProfileFields,
    pub new_password: String,
    pub new_image: Option<ImageUpload>,
}

impl ProfileEditor {
    pub fn original(&self) -> &ProfileFields {
        &self.original
    }
}

/// Open placement editor seeded from the latest user record
#[derive(Debug, Clone, Default)]
pub struct InfoEditor {
    pub role: String,
    pub current_institution: Option<InstitutionId>,
    pub accepts_nearby: bool,
    destinations: Vec<Option<InstitutionId>>,
    institutions: Vec<Institution>,
}

impl InfoEditor {
    fn seed(user: &User, institutions: Vec<Institution>) -> Self {
        let mut destinations: Vec<Option<InstitutionId>> =
            user.desired_institutions.iter().copied().map(Some).collect();
        if destinations.is_empty() {
            destinations.push(None);
        }
        Self {
            role: user.role.clone().unwrap_or_default(),
            current_institution: user.current_institution,
            accepts_nearby: user.accepts_nearby,
            destinations,
            institutions,
        }
    }

    /// Reference list for the pickers
    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    /// Destination slots in order; `None` is an empty slot
    pub fn destinations(&self) -> &[Option<InstitutionId>] {
        &self.destinations
    }

    pub fn add_destination(&mut self) {
        self.destinations.push(None);
    }

    /// Remove a slot; the last remaining slot is kept
    pub fn remove_destination(&mut self, index: usize) -> bool {
        if self.destinations.len() <= 1 || index >= self.destinations.len() {
            return false;
        }
        self.destinations.remove(index);
        true
    }

    pub fn set_destination(&mut self, index: usize, institution: Option<InstitutionId>) -> bool {
        match self.destinations.get_mut(index) {
            Some(slot) => {
                *slot = institution;
                true
            }
            None => false,
        }
    }

    fn to_update(&self) -> UserUpdate {
        UserUpdate {
            role: Some(self.role.trim().to_string()),
            current_institution: self.current_institution,
            desired_institutions: Some(self.destinations.iter().flatten().copied().collect()),
            accepts_nearby: Some(self.accepts_nearby),
            ..Default::default()
        }
    }
}

/// Result of a save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing differed from the snapshot; nothing was sent
    NoChanges,
    /// Local validation failed; nothing was sent
    Invalid,
    Failed,
    /// The editor was not open or the view was torn down
    Skipped,
}

/// Minimal update: only fields that differ from the snapshot
fn profile_diff(original: &ProfileFields, edited: &ProfileFields, new_password: &str) -> UserUpdate {
    let name = edited.name.trim();
    let email = edited.email.trim();
    UserUpdate {
        name: (name != original.name.trim()).then(|| name.to_string()),
        email: (email != original.email.trim()).then(|| email.to_string()),
        password: (!new_password.is_empty()).then(|| new_password.to_string()),
        ..Default::default()
    }
}

/// State of the main authenticated screen
#[derive(Debug)]
pub struct ProfileView {
    state: ProfileState,
    user: Option<User>,
    /// Values shown in the profile editor inputs
    pub fields: ProfileFields,
    profile_editor: Option<ProfileEditor>,
    info_editor: Option<InfoEditor>,
    photo: Avatar,
    registry: ObjectUrlRegistry,
    notices: NoticeBoard,
    scope: ViewScope,
}

impl ProfileView {
    pub fn new(registry: ObjectUrlRegistry, notice_delay: Duration) -> Self {
        Self {
            state: ProfileState::Loading,
            user: None,
            fields: ProfileFields::default(),
            profile_editor: None,
            info_editor: None,
            photo: Avatar::Default,
            registry,
            notices: NoticeBoard::new(notice_delay),
            scope: ViewScope::new(),
        }
    }

    pub fn state(&self) -> ProfileState {
        self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn photo(&self) -> &Avatar {
        &self.photo
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn profile_editor(&self) -> Option<&ProfileEditor> {
        self.profile_editor.as_ref()
    }

    pub fn profile_editor_mut(&mut self) -> Option<&mut ProfileEditor> {
        self.profile_editor.as_mut()
    }

    pub fn info_editor(&self) -> Option<&InfoEditor> {
        self.info_editor.as_ref()
    }

    pub fn info_editor_mut(&mut self) -> Option<&mut InfoEditor> {
        self.info_editor.as_mut()
    }

    /// Name for the header button
    pub fn display_name(&self) -> &str {
        match (self.state, &self.user) {
            (ProfileState::Loading, _) => "Loading...",
            (_, Some(user)) => &user.name,
            _ => "user",
        }
    }

    /// Account creation date as dd/mm/yyyy
    pub fn member_since(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.created_at)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "Not available".to_string())
    }

    /// Load the current user and their photo
    pub async fn load<G>(&mut self, gateway: &G)
    where
        G: ProfileGateway + PhotoGateway + ?Sized,
    {
        if self.state == ProfileState::LoggedOut || !self.scope.is_active() {
            return;
        }
        self.state = ProfileState::Loading;
        if self.refresh_user(gateway).await {
            self.reload_photo(gateway).await;
        }
    }

    /// Re-fetch the user record; true when it is now up to date
    async fn refresh_user<G>(&mut self, gateway: &G) -> bool
    where
        G: ProfileGateway + ?Sized,
    {
        let Some(result) = self.scope.run(gateway.current_user()).await else {
            return false;
        };
        match result {
            Ok(user) => {
                debug!(user_id = user.id, "Profile loaded");
                self.fields = ProfileFields::from(&user);
                self.user = Some(user);
                self.state = ProfileState::Ready;
                true
            }
            Err(e) if e.requires_login() => {
                self.session_lost();
                false
            }
            Err(e) => {
                self.notices.post_error(&e);
                if self.user.is_none() {
                    self.state = ProfileState::Guest;
                }
                false
            }
        }
    }

    /// Replace the profile photo, releasing the previous object URL first
    pub async fn reload_photo<G>(&mut self, gateway: &G)
    where
        G: PhotoGateway + ?Sized,
    {
        let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
            return;
        };
        self.photo = Avatar::Default;
        if let Some(avatar) = self
            .scope
            .run(resolve_avatar(gateway, &self.registry, user_id))
            .await
        {
            self.photo = avatar;
        }
    }

    /// Open the profile editor, snapshotting the current values
    pub fn open_profile_editor(&mut self) -> bool {
        if self.state != ProfileState::Ready {
            return false;
        }
        self.profile_editor = Some(ProfileEditor {
            original: self.fields.clone(),
            ..Default::default()
        });
        true
    }

    /// Close without saving; edits are discarded
    pub fn close_profile_editor(&mut self) {
        if let Some(editor) = self.profile_editor.take() {
            self.fields = editor.original;
        }
    }

    /// Send only what changed, then resynchronise with the server
    pub async fn save_profile<G>(&mut self, gateway: &G) -> SaveOutcome
    where
        G: ProfileGateway + PhotoGateway + ?Sized,
    {
        let (Some(editor), Some(user_id)) =
            (self.profile_editor.as_ref(), self.user.as_ref().map(|u| u.id))
        else {
            return SaveOutcome::Skipped;
        };

        let new_password = editor.new_password.trim().to_string();
        if !new_password.is_empty() && !is_valid_password(&new_password) {
            self.notices.post(
                NoticeKind::Error,
                format!("The new password must be at least {MIN_PASSWORD_LEN} characters long."),
            );
            return SaveOutcome::Invalid;
        }

        let update = profile_diff(&editor.original, &self.fields, &new_password);
        let image = editor.new_image.clone();
        if update.is_empty() && image.is_none() {
            self.notices.post(NoticeKind::Info, "No changes to save.");
            return SaveOutcome::NoChanges;
        }

        if !update.is_empty() {
            match self.scope.run(gateway.update_user(user_id, &update)).await {
                None => return SaveOutcome::Skipped,
                Some(Err(e)) => {
                    self.report(&e);
                    return SaveOutcome::Failed;
                }
                Some(Ok(())) => {}
            }
        }

        if let Some(image) = image {
            match self.scope.run(gateway.upload_photo(user_id, &image)).await {
                None => return SaveOutcome::Skipped,
                Some(Err(e)) => {
                    self.report(&e);
                    return SaveOutcome::Failed;
                }
                Some(Ok(())) => {}
            }
        }

        info!(user_id, "Profile saved");
        self.profile_editor = None;
        if self.refresh_user(gateway).await {
            self.reload_photo(gateway).await;
        }
        self.notices.post(NoticeKind::Success, "Profile updated.");
        SaveOutcome::Saved
    }

    /// Open the placement editor from fresh server data
    pub async fn open_info_editor<G>(&mut self, gateway: &G) -> bool
    where
        G: ProfileGateway + ?Sized,
    {
        if self.state != ProfileState::Ready {
            return false;
        }
        let fetched = self
            .scope
            .run(async { tokio::try_join!(gateway.institutions(), gateway.current_user()) })
            .await;

        match fetched {
            None => false,
            Some(Ok((institutions, user))) => {
                self.info_editor = Some(InfoEditor::seed(&user, institutions));
                self.fields = ProfileFields::from(&user);
                self.user = Some(user);
                true
            }
            Some(Err(e)) => {
                self.report(&e);
                false
            }
        }
    }

    pub fn close_info_editor(&mut self) {
        self.info_editor = None;
    }

    /// Send the full placement set back and re-fetch the user
    pub async fn save_info<G>(&mut self, gateway: &G) -> SaveOutcome
    where
        G: ProfileGateway + ?Sized,
    {
        let (Some(editor), Some(user_id)) =
            (self.info_editor.as_ref(), self.user.as_ref().map(|u| u.id))
        else {
            return SaveOutcome::Skipped;
        };
        let update = editor.to_update();

        match self.scope.run(gateway.update_user(user_id, &update)).await {
            None => SaveOutcome::Skipped,
            Some(Err(e)) => {
                self.report(&e);
                SaveOutcome::Failed
            }
            Some(Ok(())) => {
                info!(user_id, "Placement information saved");
                self.info_editor = None;
                self.refresh_user(gateway).await;
                self.notices.post(NoticeKind::Success, "Information updated.");
                SaveOutcome::Saved
            }
        }
    }

    /// Clear the session and leave the screen
    pub fn logout(&mut self, session: &Session) {
        session.logout();
        self.scope.teardown();
        self.discard_user();
        self.state = ProfileState::LoggedOut;
    }

    /// Failed call: an expired session drops everything, anything else is a notice
    fn report(&mut self, err: &ApiError) {
        if err.requires_login() {
            self.session_lost();
        } else {
            self.notices.post_error(err);
        }
    }

    /// The server no longer accepts the session; the caller sends the user to login
    fn session_lost(&mut self) {
        debug!("Session rejected, discarding profile");
        self.discard_user();
        self.state = ProfileState::Guest;
    }

    fn discard_user(&mut self) {
        self.profile_editor = None;
        self.info_editor = None;
        self.photo = Avatar::Default;
        self.user = None;
        self.fields = ProfileFields::default();
    }
}
