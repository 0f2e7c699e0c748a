//! Utility functions for common operations.
//!
//! - **URL validation**: scheme checks for feed sources and for links opened
//!   in the browser
//! - **Text processing**: Unicode-aware width calculation, truncation and
//!   control-character stripping for terminal output
//!
//! # Examples
//!
//! ```
//! use feedview::util::{display_width, truncate_to_width, validate_feed_url};
//!
//! let url = validate_feed_url("https://example.com/feed.xml").unwrap();
//! assert_eq!(url.scheme(), "https");
//!
//! assert_eq!(display_width("Hello"), 5);
//! assert_eq!(truncate_to_width("Long article title", 10), "Long ar...");
//! ```

mod text;
mod url_validator;

pub use text::{display_width, html_to_text, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_feed_url, validate_url_for_open, UrlValidationError};
