//! Sequence alignment and tabular assembly.
//!
//! This crate provides:
//! - [`align`] - positional sentinel insertion into an ordered sequence
//! - [`Dataset`] - named, index-aligned columns with lockstep row removal
//!
//! Alignment is what makes row `i` of every column refer to the same movie
//! when a field was structurally absent for some records.

pub mod align;
pub mod dataset;

pub use align::align;
pub use dataset::{Dataset, Record};
