//! End-to-end scrape orchestration for reeltab.
//!
//! This crate ties together fetching, extraction, normalization, alignment,
//! assembly, and chart rendering into the one-shot batch pipeline.

pub mod pipeline;

pub use pipeline::{
    ListingSource, PipelineConfig, ProgressReporter, ScrapeContext, ScrapeReport, SilentProgress,
    run,
};
