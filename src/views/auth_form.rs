//! Login and registration form.

use tracing::{info, warn};

use crate::models::{LoginRequest, RegisterRequest, UserId};
use crate::services::gateway::AuthGateway;
use crate::services::session::Session;
use crate::utils::validation::{MIN_PASSWORD_LEN, is_valid_email, is_valid_password};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFields {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Inline validation messages, one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn get(&self, field: AuthField) -> Option<&str> {
        match field {
            AuthField::Name => self.name.as_deref(),
            AuthField::Email => self.email.as_deref(),
            AuthField::Password => self.password.as_deref(),
            AuthField::ConfirmPassword => self.confirm_password.as_deref(),
        }
    }

    fn slot(&mut self, field: AuthField) -> &mut Option<String> {
        match field {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::ConfirmPassword => &mut self.confirm_password,
        }
    }
}

/// Result of a successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Token stored; go to the main screen
    LoggedIn { user_id: UserId, name: String },
    /// Account created; the form is back in login mode
    Registered,
}

/// State of the login/registration form
#[derive(Debug, Default)]
pub struct AuthForm {
    mode: AuthMode,
    fields: AuthFields,
    errors: FieldErrors,
    general: Option<String>,
    busy: bool,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn fields(&self) -> &AuthFields {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Form-wide message: server error, connection error, or confirmation
    pub fn general_message(&self) -> Option<&str> {
        self.general.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Edit a field; clears that field's error and the form-wide message
    pub fn set_field(&mut self, field: AuthField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AuthField::Name => self.fields.name = value,
            AuthField::Email => self.fields.email = value,
            AuthField::Password => self.fields.password = value,
            AuthField::ConfirmPassword => self.fields.confirm_password = value,
        }
        *self.errors.slot(field) = None;
        self.general = None;
    }

    /// Switch between login and registration, starting from a blank form
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.fields = AuthFields::default();
        self.errors = FieldErrors::default();
        self.general = None;
    }

    /// Run the local checks, recording one message per offending field
    pub fn validate(&mut self) -> bool {
        let registering = self.mode == AuthMode::Register;
        let mut errors = FieldErrors::default();

        if registering && self.fields.name.trim().is_empty() {
            errors.name = Some("Please enter your full name.".to_string());
        }
        if !is_valid_email(&self.fields.email) {
            errors.email = Some("Please enter a valid e-mail address.".to_string());
        }
        if !is_valid_password(&self.fields.password) {
            errors.password = Some(format!(
                "The password must be at least {MIN_PASSWORD_LEN} characters long."
            ));
        }
        if registering && self.fields.password != self.fields.confirm_password {
            errors.confirm_password = Some("The passwords do not match.".to_string());
        }

        let valid = errors.is_empty();
        self.errors = errors;
        valid
    }

    /// Validate and submit; `None` when nothing was accepted
    ///
    /// Invalid input never reaches the network.
    pub async fn submit<G>(&mut self, gateway: &G, session: &Session) -> Option<AuthOutcome>
    where
        G: AuthGateway + ?Sized,
    {
        if self.busy || !self.validate() {
            return None;
        }

        self.busy = true;
        let outcome = match self.mode {
            AuthMode::Login => self.submit_login(gateway, session).await,
            AuthMode::Register => self.submit_registration(gateway).await,
        };
        self.busy = false;
        outcome
    }

    async fn submit_login<G>(&mut self, gateway: &G, session: &Session) -> Option<AuthOutcome>
    where
        G: AuthGateway + ?Sized,
    {
        let credentials = LoginRequest {
            email: self.fields.email.trim().to_string(),
            password: self.fields.password.trim().to_string(),
        };

        match gateway.login(&credentials).await {
            Ok(response) => {
                if let Err(e) = session.establish(&response.access_token) {
                    // Still logged in for this run, just not remembered
                    warn!(error = %e, "Could not persist session token");
                }
                Some(AuthOutcome::LoggedIn {
                    user_id: response.id,
                    name: response.name,
                })
            }
            Err(e) => {
                self.general = Some(e.user_message());
                None
            }
        }
    }

    async fn submit_registration<G>(&mut self, gateway: &G) -> Option<AuthOutcome>
    where
        G: AuthGateway + ?Sized,
    {
        let registration = RegisterRequest::new(
            self.fields.name.trim().to_string(),
            self.fields.email.trim().to_string(),
            self.fields.password.clone(),
        );

        match gateway.register(&registration).await {
            Ok(created) => {
                info!(user_id = created.id, "Account created");
                self.mode = AuthMode::Login;
                self.fields = AuthFields {
                    email: self.fields.email.clone(),
                    ..Default::default()
                };
                self.errors = FieldErrors::default();
                self.general = Some("Registration complete! Please log in.".to_string());
                Some(AuthOutcome::Registered)
            }
            Err(e) => {
                self.general = Some(e.user_message());
                None
            }
        }
    }
}
