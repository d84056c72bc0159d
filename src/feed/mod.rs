//! RSS 2.0 parsing, fetching and item comparison.
//!
//! # Architecture
//!
//! - [`model`] - Plain `Feed` / `Item` values produced by the reader
//! - [`parser`] - Event-driven mapping from RSS XML to the model
//! - `charset` - Source encoding detection and transcoding to UTF-8
//! - [`fetcher`] - Single-request HTTP retrieval feeding the parser
//! - [`diff`] - Item-level comparison of two feeds
//!
//! # Example
//!
//! ```
//! use rssdiff::feed::{compare_items, parse_text};
//!
//! let old = parse_text("<rss><channel><item><guid>a</guid></item></channel></rss>").unwrap();
//! let new = parse_text(
//!     "<rss><channel>\
//!        <item><guid>b</guid><title>New</title></item>\
//!        <item><guid>a</guid></item>\
//!      </channel></rss>",
//! )
//! .unwrap();
//!
//! // `old` has fewer items, so it is the side being checked
//! assert!(compare_items(&new, &old).is_empty());
//! ```

mod charset;
pub mod diff;
pub mod fetcher;
pub mod model;
pub mod parser;

pub use charset::decode_document;
pub use diff::{compare_items, diff_feeds, unmatched_items, FeedDiff};
pub use fetcher::{FeedReader, FetchError, FetchedFeed, ReadError};
pub use model::{Cloud, Feed, Image, Item};
pub use parser::{parse_bytes, parse_text, DocumentError};
