//! Best-effort image selection for feed items.
//!
//! Candidates are tried in order, stopping at the first non-empty one:
//!
//! 1. `<media:thumbnail>`
//! 2. `<enclosure url>`
//! 3. the first `<img src>` in the item description
//! 4. the `og:image` of the page the item links to (network)
//!
//! Step 4 never fails the run. Every error there collapses to "no image".

use crate::feed::{fetch_page, FeedItem, FetchLimits};
use crate::snapshot::ResolvedItem;
use crate::util::{first_img_src, og_image, parse_http_url};
use futures::stream::{self, StreamExt};

/// Picks an image from the feed data alone (steps 1-3), without network access.
pub fn image_from_feed(item: &FeedItem) -> Option<&str> {
    non_empty(item.thumbnail.as_deref())
        .or_else(|| non_empty(item.enclosure.as_deref()))
        .or_else(|| item.description.as_deref().and_then(first_img_src))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Resolves item images, scraping linked pages when the feed has nothing.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: reqwest::Client,
    user_agent: String,
    limits: FetchLimits,
}

impl ImageResolver {
    pub fn new(client: reqwest::Client, user_agent: impl Into<String>, limits: FetchLimits) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            limits,
        }
    }

    /// Returns the item's image URL, or an empty string when none was found.
    pub async fn resolve(&self, item: &FeedItem) -> String {
        if let Some(image) = image_from_feed(item) {
            return image.to_owned();
        }

        if item.link.is_empty() {
            return String::new();
        }

        self.scrape_og_image(&item.link).await.unwrap_or_default()
    }

    /// Fetches `link` and returns its `og:image`, if any.
    ///
    /// Failures are logged at debug level and reported as `None`.
    pub async fn scrape_og_image(&self, link: &str) -> Option<String> {
        let url = match parse_http_url(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(link = %link, error = %e, "Item link is not fetchable");
                return None;
            }
        };

        let html = match fetch_page(&self.client, url.as_str(), &self.user_agent, self.limits).await
        {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(link = %url, error = %e, "og:image fetch failed");
                return None;
            }
        };

        let image = og_image(&html).map(str::to_owned);
        if image.is_none() {
            tracing::debug!(link = %url, "No og:image on page");
        }
        image
    }

    /// Resolves every item, keeping feed order.
    ///
    /// Up to `concurrency` page scrapes run at once; `buffered` yields results
    /// in input order regardless of completion order.
    pub async fn resolve_all(&self, items: Vec<FeedItem>, concurrency: usize) -> Vec<ResolvedItem> {
        stream::iter(items)
            .map(|item| async move {
                let image = self.resolve(&item).await;
                tracing::debug!(title = %item.title, image = %image, "Resolved item image");
                ResolvedItem {
                    title: item.title,
                    link: item.link,
                    pub_date: item.pub_date,
                    image,
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
