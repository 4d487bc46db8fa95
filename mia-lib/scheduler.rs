//! Delayed jobs that can be cancelled until they run.
//!
//! The scheduler has no timer of its own: the host calls
//! [`JobScheduler::tick`] once per resolution and every job whose delay has
//! elapsed runs, in the order it was scheduled.

use std::{
  fmt,
  sync::{
    Arc,
    atomic::{
      AtomicBool,
      Ordering,
    },
  },
  time::Duration,
};

use tracing::trace;

use crate::config::SchedulerConfig;

/// Handle to a scheduled job.
#[derive(Debug, Clone)]
pub struct JobHandle {
  done: Arc<AtomicBool>,
}

impl JobHandle {
  /// Stops the job from running. Returns `false` if it already ran or was
  /// already cancelled.
  pub fn cancel(&self) -> bool {
    !self.done.swap(true, Ordering::AcqRel)
  }

  /// Whether the job ran or was cancelled.
  pub fn is_done(&self) -> bool {
    self.done.load(Ordering::Acquire)
  }
}

struct Job {
  due:  Duration,
  done: Arc<AtomicBool>,
  run:  Box<dyn FnOnce()>,
}

impl Job {
  fn run(self) -> bool {
    if self.done.swap(true, Ordering::AcqRel) {
      return false;
    }
    (self.run)();
    true
  }
}

impl fmt::Debug for Job {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Job")
      .field("due", &self.due)
      .field("done", &self.done)
      .finish_non_exhaustive()
  }
}

#[derive(Debug)]
pub struct JobScheduler {
  resolution: Duration,
  now:        Duration,
  /// Ordered by due time, then by scheduling order.
  jobs:       Vec<Job>,
}

impl Default for JobScheduler {
  fn default() -> Self {
    Self::new(SchedulerConfig::default().resolution())
  }
}

impl JobScheduler {
  pub fn new(resolution: Duration) -> Self {
    Self {
      resolution,
      now: Duration::ZERO,
      jobs: Vec::new(),
    }
  }

  pub fn from_config(config: &SchedulerConfig) -> Self {
    Self::new(config.resolution())
  }

  pub fn resolution(&self) -> Duration {
    self.resolution
  }

  /// Time elapsed over all ticks so far.
  pub fn now(&self) -> Duration {
    self.now
  }

  /// Jobs waiting to run, cancelled ones included until their tick comes.
  pub fn pending(&self) -> usize {
    self.jobs.len()
  }

  pub fn schedule(&mut self, delay: Duration, job: impl FnOnce() + 'static) -> JobHandle {
    let due = self.now + delay;
    let done = Arc::new(AtomicBool::new(false));
    let at = self.jobs.partition_point(|job| job.due <= due);
    self.jobs.insert(at, Job {
      due,
      done: done.clone(),
      run: Box::new(job),
    });
    JobHandle { done }
  }

  /// Advances time by one resolution and runs every job that is due.
  /// Returns how many ran.
  pub fn tick(&mut self) -> usize {
    self.now += self.resolution;
    let due = self.jobs.partition_point(|job| job.due <= self.now);
    let ran = self.jobs.drain(..due).map(Job::run).filter(|&ran| ran).count();
    if ran > 0 {
      trace!(now = ?self.now, ran, "scheduler tick");
    }
    ran
  }
}
