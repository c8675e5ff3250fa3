mod service;
mod traits;
mod workspace_sweep_job;

pub use service::SchedulerService;
pub use traits::{JobResult, SchedulerJob};
pub use workspace_sweep_job::WorkspaceSweepJob;
