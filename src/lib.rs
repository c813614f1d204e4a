//! Snapshot an RSS feed to JSON, with a representative image per item.
//!
//! The [`pipeline::run`] entry point fetches the configured feed, keeps the
//! first items, picks an image for each (feed thumbnail, enclosure, inline
//! `<img>`, then the linked page's `og:image`) and writes
//! `{ "updatedAt", "items" }` to disk.

pub mod config;
pub mod feed;
pub mod pipeline;
pub mod resolver;
pub mod snapshot;
pub mod util;
