use std::time::Duration;

use async_trait::async_trait;

/// Result type for scheduler job execution.
pub type JobResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Trait for defining a scheduled job.
///
/// Jobs are executed periodically by the [`SchedulerService`]; errors are
/// logged and the job is retried on its next interval.
///
/// [`SchedulerService`]: super::SchedulerService
#[async_trait]
pub trait SchedulerJob: Send + Sync {
    /// Unique name of this job, used for logging.
    fn name(&self) -> &'static str;

    /// Interval between job executions.
    fn interval(&self) -> Duration;

    /// Executes the job logic.
    async fn execute(&self) -> JobResult;
}
