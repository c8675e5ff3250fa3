pub mod scheduler;

pub use scheduler::{JobResult, SchedulerJob, SchedulerService, WorkspaceSweepJob};
