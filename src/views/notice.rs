//! Short-lived user-visible messages.

use chrono::{DateTime, Duration, Utc};

use crate::services::api_client::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// A message that hides itself once `expires_at` has passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub expires_at: DateTime<Utc>,
}

/// Holds the notice currently shown by a view
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    delay: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            current: None,
        }
    }

    pub fn post(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.post_at(kind, text, Utc::now());
    }

    pub fn post_at(&mut self, kind: NoticeKind, text: impl Into<String>, now: DateTime<Utc>) {
        self.current = Some(Notice {
            kind,
            text: text.into(),
            expires_at: now
                .checked_add_signed(self.delay)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    /// Post the user-facing text of a failed call
    pub fn post_error(&mut self, err: &ApiError) {
        self.post(NoticeKind::Error, err.user_message());
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Utc::now())
    }

    pub fn current_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.current.as_ref().filter(|n| now < n.expires_at)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
