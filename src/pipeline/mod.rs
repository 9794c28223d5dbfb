//! Batch processing pipeline: extraction + municipality enrichment.

pub mod processor;
pub mod types;

pub use processor::BatchProcessor;
