//! Page fetching, selector-based field extraction, and normalization.
//!
//! This crate provides:
//! - [`Fetcher`] - one-shot HTTP retrieval of the listing page
//! - [`extract`] - CSS-selector extraction of ordered text fragments
//! - [`normalize`] - whitespace trimming and numeric parsing into [`Value`]s
//!
//! [`Value`]: reeltab_shared::Value

pub mod extract;
pub mod fetch;
pub mod normalize;

pub use extract::extract;
pub use fetch::{FetchOptions, FetchedListing, Fetcher};
pub use normalize::{normalize, parse_number, trim_text};
