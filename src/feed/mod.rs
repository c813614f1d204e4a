//! Feed retrieval and parsing.
//!
//! - [`fetcher`] - HTTP downloads with optional timeout and a body size cap
//! - [`parser`] - RSS `channel/item` extraction using `quick-xml`
//!
//! # Example
//!
//! ```ignore
//! use notefeed::feed::{fetch_feed, parse_feed, FetchLimits};
//!
//! let bytes = fetch_feed(&client, "https://note.com/loyal_dill1011/rss", limits).await?;
//! let items = parse_feed(&bytes, 12)?;
//! ```

mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, fetch_page, FetchError, FetchLimits};
pub use parser::{parse_feed, FeedItem, ParseError};
