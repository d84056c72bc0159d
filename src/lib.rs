//! Parse RSS 2.0 feeds and find the items one revision of a feed has that
//! another lacks.
//!
//! Feeds are read with [`parse_text`], [`parse_bytes`] or
//! [`FeedReader::parse_url`] and compared with [`compare_items`] or
//! [`diff_feeds`].

pub mod config;
pub mod feed;
pub mod util;

pub use config::{Config, ConfigError, FetchConfig};
pub use feed::{
    compare_items, diff_feeds, parse_bytes, parse_text, unmatched_items, Cloud, DocumentError,
    Feed, FeedDiff, FeedReader, FetchError, FetchedFeed, Image, Item, ReadError,
};
