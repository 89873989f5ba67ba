//! Exclusive unit-of-work gate.
//!
//! A store whose clones share one transaction slot (a single libSQL
//! connection, or one in-memory snapshot) must not let two units overlap.
//! [`UnitGate::enter`] waits for the gate and parks the owned guard inside
//! the gate itself, so `begin` and `commit`/`rollback` can run as separate
//! calls on any clone of the store.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
pub struct UnitGate {
    gate: Arc<Mutex<()>>,
    held: Arc<Mutex<Option<OwnedMutexGuard<()>>>>,
}

impl UnitGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other unit is open, then hold the gate.
    pub async fn enter(&self) {
        let guard = Arc::clone(&self.gate).lock_owned().await;
        *self.held.lock().await = Some(guard);
    }

    /// Release the gate. A no-op when nothing is held.
    pub async fn leave(&self) {
        drop(self.held.lock().await.take());
    }

    /// Whether a unit currently holds the gate.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.gate.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn second_enter_waits_for_leave() {
        let gate = UnitGate::new();
        gate.enter().await;
        assert!(gate.is_held());

        let other = gate.clone();
        let waiter = tokio::spawn(async move {
            other.enter().await;
            other.leave().await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.leave().await;
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter finished")
            .expect("waiter did not panic");
        assert!(!gate.is_held());
    }

    #[tokio::test]
    async fn leave_without_enter_is_a_no_op() {
        let gate = UnitGate::new();
        gate.leave().await;
        gate.enter().await;
        gate.leave().await;
        assert!(!gate.is_held());
    }
}
