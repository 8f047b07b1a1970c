//! Debounced persistence of the buffer.
//!
//! Time is passed in explicitly as milliseconds, so the scheduler is driven
//! by the event loop's clock in the frontend and by plain numbers in tests.

/// Debounce window after the last change.
pub const AUTOSAVE_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutosaveState {
    #[default]
    Idle,
    Pending,
    Saved,
}

/// Status indicator shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Unsaved,
    Autosaved,
    Saved,
}

impl SaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unsaved => "Unsaved",
            Self::Autosaved => "Autosaved",
            Self::Saved => "Saved",
        }
    }
}

/// Identifies one scheduled persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    id: u64,
    due_at_ms: u64,
}

impl TimerToken {
    pub const fn due_at_ms(self) -> u64 {
        self.due_at_ms
    }
}

/// Holds at most one pending persist; each change replaces it.
#[derive(Debug)]
pub struct AutosaveScheduler {
    delay_ms: u64,
    pending: Option<TimerToken>,
    next_id: u64,
    state: AutosaveState,
    status: Option<SaveStatus>,
}

impl AutosaveScheduler {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
            next_id: 0,
            state: AutosaveState::Idle,
            status: None,
        }
    }

    pub const fn state(&self) -> AutosaveState {
        self.state
    }

    /// Current indicator, `None` before anything happened.
    pub const fn status(&self) -> Option<SaveStatus> {
        self.status
    }

    pub const fn pending(&self) -> Option<TimerToken> {
        self.pending
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Supersede any pending persist with a new one due after the window.
    pub const fn on_change(&mut self, now_ms: u64) -> TimerToken {
        let token = TimerToken {
            id: self.next_id,
            due_at_ms: now_ms.saturating_add(self.delay_ms),
        };
        self.next_id += 1;
        self.pending = Some(token);
        self.state = AutosaveState::Pending;
        self.status = Some(SaveStatus::Unsaved);
        token
    }

    /// Take the pending token once its window has elapsed.
    pub fn take_due(&mut self, now_ms: u64) -> Option<TimerToken> {
        let token = self.pending?;
        if now_ms >= token.due_at_ms {
            self.pending = None;
            Some(token)
        } else {
            None
        }
    }

    /// Take the pending token regardless of time.
    pub const fn flush(&mut self) -> Option<TimerToken> {
        self.pending.take()
    }

    /// Record that the persist for `token` went through.
    ///
    /// Ignored if a newer change has been scheduled since.
    pub fn complete(&mut self, token: TimerToken) {
        if self.pending.is_some_and(|pending| pending.id != token.id) {
            return;
        }
        self.state = AutosaveState::Saved;
        self.status = Some(SaveStatus::Autosaved);
    }

    /// Explicit save. Does not cancel a pending autosave.
    pub const fn mark_saved(&mut self) {
        self.status = Some(SaveStatus::Saved);
        if self.pending.is_none() {
            self.state = AutosaveState::Saved;
        }
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(AUTOSAVE_DELAY_MS)
    }
}
