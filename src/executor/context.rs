//! Per-call execution context
//!
//! Carries the timing state of one query execution down the
//! executor → assembler → assessor chain. Nothing here is shared between
//! concurrent executions.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::observability::Timer;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    query_id: Uuid,
    timer: Timer,
    deadline: Option<Instant>,
    phases: Vec<(&'static str, Duration)>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            query_id: Uuid::new_v4(),
            timer: Timer::new(),
            deadline: None,
            phases: Vec::new(),
        }
    }

    /// Stop scanning once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn query_id(&self) -> Uuid {
        self.query_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn deadline_reached(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timer.elapsed_ms()
    }

    /// Run `f`, recording its duration under `phase`
    pub fn time_phase<T>(&mut self, phase: &'static str, f: impl FnOnce(&Self) -> T) -> T {
        let timer = Timer::new();
        let out = f(&*self);
        self.phases.push((phase, timer.elapsed()));
        out
    }

    /// Recorded phases in execution order
    pub fn phases(&self) -> &[(&'static str, Duration)] {
        &self.phases
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
