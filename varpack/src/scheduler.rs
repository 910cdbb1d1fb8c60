//! Single-flight scheduling of render passes.
//!
//! This is a pure state machine; the controller drives it and performs the
//! actual rendering. At most one pass runs at a time, and any number of
//! refresh requests made while a pass runs collapse into one follow-up pass.
//!
//! ```text
//!            request                      complete (nothing pending)
//!   Idle ───────────────▶ Rendering ─────────────────────────▶ Idle
//!                          │    ▲  │
//!                  request │    │  │ fail
//!          (refresh_pending│    │  └────────────────────────▶ Idle
//!               = true)    └────┘
//!                     complete (pending) → Rendering again
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Rendering,
}

/// What the caller should do after [`RegenerationScheduler::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// No pass was running; start one now.
    Start,
    /// A pass is running; a follow-up has been recorded.
    Coalesced,
}

#[derive(Debug)]
pub struct RegenerationScheduler {
    state: PassState,
    refresh_pending: bool,
    passes: u64,
}

impl Default for RegenerationScheduler {
    fn default() -> Self {
        RegenerationScheduler::new()
    }
}

impl RegenerationScheduler {
    pub fn new() -> Self {
        RegenerationScheduler {
            state: PassState::Idle,
            refresh_pending: false,
            passes: 0,
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn is_rendering(&self) -> bool {
        self.state == PassState::Rendering
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Number of passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Ask for a pass.
    pub fn request(&mut self) -> Trigger {
        match self.state {
            PassState::Idle => {
                self.state = PassState::Rendering;
                self.passes += 1;
                Trigger::Start
            }
            PassState::Rendering => {
                if !self.refresh_pending {
                    tracing::debug!("Refresh requested during pass, deferring");
                }
                self.refresh_pending = true;
                Trigger::Coalesced
            }
        }
    }

    /// The running pass finished. Returns `true` when a follow-up pass has
    /// been started and should be run now.
    pub fn complete(&mut self) -> bool {
        debug_assert_eq!(self.state, PassState::Rendering);
        if std::mem::take(&mut self.refresh_pending) {
            self.passes += 1;
            self.state = PassState::Rendering;
            true
        } else {
            self.state = PassState::Idle;
            false
        }
    }

    /// The running pass failed. Pending refreshes are dropped.
    pub fn fail(&mut self) {
        self.state = PassState::Idle;
        self.refresh_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pass() {
        let mut scheduler = RegenerationScheduler::new();
        assert_eq!(scheduler.request(), Trigger::Start);
        assert!(scheduler.is_rendering());
        assert!(!scheduler.complete());
        assert_eq!(scheduler.state(), PassState::Idle);
        assert_eq!(scheduler.passes(), 1);
    }

    #[test]
    fn test_requests_during_pass_coalesce() {
        let mut scheduler = RegenerationScheduler::new();
        scheduler.request();
        for _ in 0..5 {
            assert_eq!(scheduler.request(), Trigger::Coalesced);
        }
        assert!(scheduler.refresh_pending());

        assert!(scheduler.complete());
        assert!(scheduler.is_rendering());
        assert!(!scheduler.refresh_pending());

        assert!(!scheduler.complete());
        assert_eq!(scheduler.passes(), 2);
    }

    #[test]
    fn test_failure_drops_pending() {
        let mut scheduler = RegenerationScheduler::new();
        scheduler.request();
        scheduler.request();
        scheduler.fail();
        assert_eq!(scheduler.state(), PassState::Idle);
        assert!(!scheduler.refresh_pending());
        assert_eq!(scheduler.request(), Trigger::Start);
    }
}
