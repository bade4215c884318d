//! Pending notification models.

use serde::{Deserialize, Serialize};

/// Response of the notification counter endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotificationCount {
    pub count: u32,
}

/// Badge text for a pending count: hidden at zero, capped at "9+"
pub fn badge_label(count: u32) -> Option<String> {
    match count {
        0 => None,
        1..=9 => Some(count.to_string()),
        _ => Some("9+".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_label() {
        assert_eq!(badge_label(0), None);
        assert_eq!(badge_label(1).as_deref(), Some("1"));
        assert_eq!(badge_label(9).as_deref(), Some("9"));
        assert_eq!(badge_label(10).as_deref(), Some("9+"));
    }
}
