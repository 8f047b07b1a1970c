/// How long a notification stays up.
pub const TOAST_DURATION_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    expires_at_ms: u64,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>, now_ms: u64) -> Self {
        Self {
            level,
            message: message.into(),
            expires_at_ms: now_ms.saturating_add(TOAST_DURATION_MS),
        }
    }

    pub const fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires_after_three_seconds() {
        let toast = Toast::new(ToastLevel::Success, "File saved", 500);
        assert!(!toast.is_expired(3_499));
        assert!(toast.is_expired(3_500));
    }
}
