//! Auto-hide for overlay controls.
//!
//! A refreshing one-shot timer: every activity replaces the pending
//! deadline, and the controls hide once a deadline passes unrefreshed.
//! Time is supplied by the caller in milliseconds since session start.

/// Default inactivity window before controls hide.
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoHide {
    timeout_ms: u64,
    visible: bool,
    deadline: Option<u64>,
}

impl AutoHide {
    /// Start visible, with the first deadline scheduled from `now_ms`.
    ///
    /// A `timeout_ms` of 0 disables hiding entirely.
    pub const fn new(timeout_ms: u64, now_ms: u64) -> Self {
        let mut timer = Self {
            timeout_ms,
            visible: true,
            deadline: None,
        };
        timer.on_activity(now_ms);
        timer
    }

    /// A timer that never hides.
    pub const fn disabled() -> Self {
        Self::new(0, 0)
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub const fn is_enabled(&self) -> bool {
        self.timeout_ms > 0
    }

    /// User activity or a slide change: show and push the deadline out.
    pub const fn on_activity(&mut self, now_ms: u64) {
        self.visible = true;
        self.deadline = if self.timeout_ms > 0 {
            Some(now_ms.saturating_add(self.timeout_ms))
        } else {
            None
        };
    }

    /// Hide once the deadline has passed. Returns true if visibility changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                let changed = self.visible;
                self.visible = false;
                changed
            }
            _ => false,
        }
    }

    /// Force the controls visible without scheduling a hide.
    pub const fn show(&mut self) {
        self.visible = true;
        self.deadline = None;
    }

    /// Force the controls hidden, cancelling any pending deadline.
    pub const fn hide(&mut self) {
        self.visible = false;
        self.deadline = None;
    }

    /// Change the inactivity window and restart the timer from `now_ms`.
    pub const fn set_timeout(&mut self, timeout_ms: u64, now_ms: u64) {
        self.timeout_ms = timeout_ms;
        self.on_activity(now_ms);
    }
}
