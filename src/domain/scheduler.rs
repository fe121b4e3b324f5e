//! Thread-safe handle around a [`RiskSupervisor`].
//!
//! Cycles never overlap: a trigger that arrives while a cycle is running is
//! refused with [`RatchetError::CycleInProgress`]. Readers get the snapshot
//! published at the last cycle boundary and never wait on a running cycle.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::error::RatchetError;
use super::strategy::Strategy;
use super::supervisor::{CyclePorts, CycleReport, RiskSupervisor, SupervisorSnapshot};

pub struct SharedSupervisor {
    inner: Mutex<RiskSupervisor>,
    published: RwLock<Arc<SupervisorSnapshot>>,
}

impl SharedSupervisor {
    pub fn new(supervisor: RiskSupervisor) -> Self {
        let snapshot = Arc::new(supervisor.snapshot());
        SharedSupervisor {
            inner: Mutex::new(supervisor),
            published: RwLock::new(snapshot),
        }
    }

    /// Run a cycle now unless one is already in flight.
    pub fn try_run_cycle(&self, ports: &CyclePorts<'_>) -> Result<CycleReport, RatchetError> {
        let mut guard = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(RatchetError::CycleInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        let report = guard.run_cycle(ports, Utc::now())?;
        self.publish(&guard);
        Ok(report)
    }

    /// State as of the last completed cycle or configuration change.
    pub fn snapshot(&self) -> Arc<SupervisorSnapshot> {
        let published = self.published.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&published)
    }

    /// Waits for an in-flight cycle; applies from the next evaluation.
    pub fn set_strategy(&self, strategy: Strategy) {
        let mut guard = self.lock();
        guard.set_strategy(strategy);
        self.publish(&guard);
    }

    pub fn reset_capital(&self, capital: f64) -> Result<(), RatchetError> {
        let mut guard = self.lock();
        guard.reset_capital(capital)?;
        self.publish(&guard);
        Ok(())
    }

    /// Run cycles every `interval` until `max_cycles` have completed, or
    /// forever when `None`. Returns the number of completed cycles.
    ///
    /// A refused trigger is logged and skipped. A missing strategy stops
    /// the loop.
    pub fn run_every(
        &self,
        ports: &CyclePorts<'_>,
        interval: Duration,
        max_cycles: Option<usize>,
    ) -> Result<usize, RatchetError> {
        let mut completed = 0usize;
        loop {
            match self.try_run_cycle(ports) {
                Ok(report) => {
                    completed += 1;
                    info!(
                        cycle = completed,
                        trades = report.trades().count(),
                        value = report.performance.portfolio_value,
                        "cycle finished"
                    );
                }
                Err(RatchetError::CycleInProgress) => {
                    warn!("previous cycle still running; skipping trigger");
                }
                Err(e) => return Err(e),
            }
            if max_cycles.is_some_and(|max| completed >= max) {
                return Ok(completed);
            }
            thread::sleep(interval);
        }
    }

    fn lock(&self) -> MutexGuard<'_, RiskSupervisor> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, supervisor: &RiskSupervisor) {
        let snapshot = Arc::new(supervisor.snapshot());
        let mut published = self.published.write().unwrap_or_else(PoisonError::into_inner);
        *published = snapshot;
    }
}
