//! Periodic maintenance jobs.
//!
//! `Schedule` is only the registration surface: bootstrap registers named
//! jobs with an interval, and `spawn` hands each one to a tokio task. The
//! jobs themselves are small synchronous closures (pruning expired
//! rate-limit windows and the like).

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::debug;

type Job = Arc<dyn Fn() + Send + Sync>;

pub struct ScheduledJob {
    name: String,
    every: Duration,
    job: Job,
}

impl ScheduledJob {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn every(&self) -> Duration {
        self.every
    }
}

impl std::fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("name", &self.name)
            .field("every", &self.every)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Schedule {
    jobs: Vec<ScheduledJob>,
}

impl Schedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job` to run every `every`.
    pub fn every(
        &mut self,
        every: Duration,
        name: &str,
        job: impl Fn() + Send + Sync + 'static,
    ) -> &mut Self {
        self.jobs.push(ScheduledJob {
            name: name.to_string(),
            every,
            job: Arc::new(job),
        });
        self
    }

    /// Registered jobs, in registration order.
    #[must_use]
    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    /// Run one pass of every job immediately, without waiting for intervals.
    pub fn run_pending(&self) {
        for job in &self.jobs {
            debug!(job = %job.name, "Running scheduled job");
            (job.job)();
        }
    }

    /// Spawn one tokio task per job, each ticking on its own interval.
    pub fn spawn(self) {
        for job in self.jobs {
            tokio::spawn(async move {
                let mut ticker = interval(job.every);
                // The first tick fires immediately; skip it so jobs start
                // one full interval after boot.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    debug!(job = %job.name, "Running scheduled job");
                    (job.job)();
                }
            });
        }
    }
}
