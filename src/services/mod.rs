mod ingest;
pub mod matcher;
mod scheduler;

pub use ingest::IngestPipeline;
pub use scheduler::Scheduler;
