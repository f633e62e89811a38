// src/engine/settle.rs

/// One-way settlement flag for a launch attempt.
///
/// The first call to [`settle`](Self::settle) fixes the outcome; every
/// later call is a silent no-op that reports `false`. Checked and set within
/// the same event handler, so no lock is needed.
#[derive(Debug, Clone)]
pub struct SettlementGuard<T> {
    outcome: Option<T>,
}

impl<T> Default for SettlementGuard<T> {
    fn default() -> Self {
        Self { outcome: None }
    }
}

impl<T: Copy> SettlementGuard<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `outcome` if nothing was recorded yet.
    pub fn settle(&mut self, outcome: T) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn outcome(&self) -> Option<T> {
        self.outcome
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }
}
