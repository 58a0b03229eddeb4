//! Derives totals, per-period deltas, efficiency ratios, year-end values and
//! year-over-year growth from small dated tracking files (work hours, task
//! progress, net worth).
//!
//! The binaries are thin wrappers over `cli::main`, one per dataset.

pub mod cli;
pub mod compute;
pub mod config;
pub mod data;
pub mod growth;
pub mod interpolate;
pub mod pipeline;
pub mod read;
pub mod series;
pub mod write;
