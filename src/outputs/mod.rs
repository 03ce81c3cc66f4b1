//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: writes the [`Snapshot`](crate::models::Snapshot) consumed by the dashboard
//!
//! # Output Structure
//!
//! ```text
//! docs/data/
//! └── latest_news.json   # replaced on every run
//! ```

pub mod json;
