use std::sync::Arc;

use tokio::time::MissedTickBehavior;

use super::traits::SchedulerJob;

/// Runs registered jobs on their configured intervals.
///
/// Each job gets its own tokio task; the first tick fires immediately, so
/// jobs also run once at startup.
#[derive(Default)]
pub struct SchedulerService {
    jobs: Vec<Arc<dyn SchedulerJob>>,
}

impl SchedulerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(mut self, job: impl SchedulerJob + 'static) -> Self {
        self.jobs.push(Arc::new(job));
        self
    }

    pub fn with_arc_job(mut self, job: Arc<dyn SchedulerJob>) -> Self {
        self.jobs.push(job);
        self
    }

    pub fn start(&self) {
        for job in &self.jobs {
            let job = Arc::clone(job);
            tokio::spawn(async move {
                let mut timer = tokio::time::interval(job.interval());
                timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    timer.tick().await;
                    if let Err(e) = job.execute().await {
                        tracing::error!("Job '{}' execution error: {}", job.name(), e);
                    }
                }
            });
        }

        tracing::info!("Scheduler started with {} jobs", self.jobs.len());
    }
}
