//! Aggregation of paginated collections into one ordered list.

use std::future::Future;

use futures_util::{StreamExt, TryStreamExt, future};

use crate::model::PageResult;
use crate::remote::ApiError;

/// Fetches every page of a collection and concatenates them in page order.
///
/// Meant for small collections: by default every page after the first is
/// requested at once. `max_in_flight` caps that fan-out.
#[derive(Clone, Copy, Debug)]
pub struct PaginatedAggregator {
    page_size: u32,
    max_in_flight: Option<usize>,
}

impl PaginatedAggregator {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            max_in_flight: None,
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight.filter(|n| *n > 0);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// `fetch_page(page, page_size)` is called once for page 1 and then once
    /// for each of pages `2..=total_pages`. Any failed page fails the whole
    /// aggregation.
    pub async fn fetch_all<T, F, Fut>(&self, fetch_page: F) -> Result<Vec<T>, ApiError>
    where
        F: Fn(u32, u32) -> Fut,
        Fut: Future<Output = Result<PageResult<T>, ApiError>>,
    {
        let first = fetch_page(1, self.page_size).await?;
        let total_pages = total_pages(first.total_count, self.page_size);
        if total_pages <= 1 {
            return Ok(first.items);
        }
        tracing::debug!(
            total = first.total_count,
            pages = total_pages,
            "fetching remaining pages"
        );

        let rest = (2..=total_pages).map(|page| fetch_page(page, self.page_size));
        let pages: Vec<PageResult<T>> = match self.max_in_flight {
            None => future::try_join_all(rest).await?,
            Some(limit) => {
                futures_util::stream::iter(rest)
                    .buffered(limit)
                    .try_collect()
                    .await?
            }
        };

        let mut items = first.items;
        for page in pages {
            items.extend(page.items);
        }
        Ok(items)
    }
}

/// `ceil(total_count / page_size)`.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "tests/paginate_tests.rs"]
mod tests;
