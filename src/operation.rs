use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use ustr::Ustr;

/// Where one dashboard control is in its request cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationState {
    #[default]
    Idle,
    Pending,
    /// Last run failed with this message. A new run may start.
    Failed(String),
}

/// Idle → Pending → Idle/Failed state machine for one control. Starting
/// while Pending is rejected, never queued.
#[derive(Debug, Clone)]
pub struct OperationGuard {
    name: Ustr,
    state: Arc<Mutex<OperationState>>,
}

impl OperationGuard {
    pub fn new(name: &str) -> Self {
        Self {
            name: ustr::ustr(name),
            state: Arc::new(Mutex::new(OperationState::Idle)),
        }
    }

    pub fn name(&self) -> Ustr {
        self.name
    }

    fn lock(&self) -> MutexGuard<'_, OperationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> OperationState {
        self.lock().clone()
    }

    pub fn is_pending(&self) -> bool {
        *self.lock() == OperationState::Pending
    }

    pub fn try_begin(&self) -> Result<OperationTicket> {
        let mut state = self.lock();
        if *state == OperationState::Pending {
            tracing::warn!("{} requested while pending, rejecting", self.name);
            return Err(Error::OperationPending(self.name));
        }
        *state = OperationState::Pending;
        Ok(OperationTicket {
            state: Arc::clone(&self.state),
            finished: false,
        })
    }
}

/// Held for the duration of one run. Dropping it unfinished (e.g. a
/// cancelled future) returns the control to Idle.
#[derive(Debug)]
pub struct OperationTicket {
    state: Arc<Mutex<OperationState>>,
    finished: bool,
}

impl OperationTicket {
    pub fn finish<T>(mut self, result: &Result<T>) {
        let next = match result {
            Ok(_) => OperationState::Idle,
            Err(e) => OperationState::Failed(e.to_string()),
        };
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
        self.finished = true;
    }
}

impl Drop for OperationTicket {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = OperationState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_while_pending() {
        let guard = OperationGuard::new("compare");
        let ticket = guard.try_begin().unwrap();
        assert!(guard.is_pending());

        let err = guard.try_begin().unwrap_err();
        assert!(matches!(err, Error::OperationPending(name) if name == "compare"));

        ticket.finish(&Ok(()));
        assert_eq!(guard.state(), OperationState::Idle);
        assert!(guard.try_begin().is_ok());
    }

    #[test]
    fn test_failure_is_recorded_and_recoverable() {
        let guard = OperationGuard::new("llm");
        let ticket = guard.try_begin().unwrap();
        ticket.finish::<()>(&Err(Error::LlmRejected("quota".into())));
        assert_eq!(
            guard.state(),
            OperationState::Failed("llm backend rejected the query: quota".into())
        );

        let ticket = guard.try_begin().unwrap();
        assert!(guard.is_pending());
        drop(ticket);
        assert_eq!(guard.state(), OperationState::Idle);
    }

    #[test]
    fn test_clones_share_state() {
        let guard = OperationGuard::new("llm");
        let other = guard.clone();
        let _ticket = guard.try_begin().unwrap();
        assert!(other.try_begin().is_err());
    }
}
