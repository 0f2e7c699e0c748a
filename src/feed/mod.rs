//! Retrieving and decoding feeds.
//!
//! - [`fetcher`] - one HTTP GET per call, bounded body size, no retries
//! - [`parser`] - pure RSS/Atom/JSON Feed decoding into [`Entry`] values
//!   using the `feed-rs` crate
//!
//! Both halves are independent of the UI; the [`crate::loader`] module
//! strings them together.

mod fetcher;
mod parser;

pub use fetcher::{Fetcher, NetworkError, DEFAULT_MAX_FEED_BYTES, DEFAULT_TIMEOUT};
pub use parser::{parse_feed, Entry, ParseError};
