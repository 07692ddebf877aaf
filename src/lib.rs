//! Fetches a day of RescueTime interval data at five-minute resolution.
//!
//! ```no_run
//! let records = rtexport::retrieve_day("2023-05-01", "your-api-key")?;
//! for rec in &records {
//!     println!("{} {:>4}s {} ({})", rec.start, rec.spent, rec.activity, rec.category);
//! }
//! # Ok::<(), rtexport::RetrieveError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::Fetcher;
pub use config::FetcherConfig;
pub use error::{FetchError, RetrieveError, RowField};
pub use models::{parse_rows, DayReport, Record};

/// One-shot fetch with the default configuration.
///
/// Builds a fresh client each time; keep a [`Fetcher`] around when
/// fetching several days.
pub fn retrieve_day(day: &str, api_key: &str) -> Result<Vec<Record>, RetrieveError> {
    Fetcher::with_defaults()?.retrieve_day(day, api_key)
}
