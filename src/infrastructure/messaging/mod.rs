pub mod background_processor;
pub mod mpsc_job_queue;

pub use background_processor::BackgroundProcessor;
pub use mpsc_job_queue::{MpscJobQueue, MpscJobQueueReceiver, QueueStats};
