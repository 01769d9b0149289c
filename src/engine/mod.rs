//! Core engine: tick ingestion, the scan pass and its scheduler.

pub mod board;
pub mod pipeline;
pub mod scanner;
pub mod scheduler;
pub mod tick_store;

pub use board::SignalBoard;
pub use pipeline::{PipelineConfig, ScanPipeline};
pub use scheduler::{ScanScheduler, SchedulerHandle, TriggerOutcome};
