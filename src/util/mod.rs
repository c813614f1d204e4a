//! Utility functions for common operations.
//!
//! - **HTML scanning**: first-match tag/attribute extraction for `<img>` and
//!   `<meta property="og:image">` without a DOM
//! - **Link checks**: whether an item link is something we can fetch
//!
//! # Examples
//!
//! ```
//! use notefeed::util::{first_img_src, og_image, parse_http_url};
//!
//! assert_eq!(first_img_src(r#"<img src="https://a/b.jpg">"#), Some("https://a/b.jpg"));
//! assert_eq!(og_image("<p>none</p>"), None);
//! assert!(parse_http_url("https://example.com").is_ok());
//! ```

mod html;
mod link;

pub use html::{first_img_src, og_image};
pub use link::{parse_http_url, LinkError};
