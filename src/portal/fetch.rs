//! Paging through the portal's existing diary entries.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{DiaryPortal, RemoteEntryRecord};
use crate::config::FetchConfig;
use crate::error::{DiaryError, Result};

/// Pacing and safety bound for [`fetch_all`].
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub page_delay: Duration,
    pub max_pages: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            page_delay: config.page_delay(),
            max_pages: config.max_pages.max(1),
        }
    }
}

/// Fetch every page, starting at 1, and concatenate the records.
///
/// Stops once the reported `last_page` is not beyond the current page, so a
/// missing, zero or shrinking `last_page` still ends the loop. A listing
/// still going after `max_pages` is an error, as is any failed page: the
/// snapshot is either complete or not returned.
pub fn fetch_all<P>(portal: &P, options: &FetchOptions) -> Result<Vec<RemoteEntryRecord>>
where
    P: DiaryPortal + ?Sized,
{
    let mut page: u32 = 1;
    let mut records = Vec::new();

    loop {
        let current = portal.fetch_page(page)?;
        let last_page = current.last_page.unwrap_or(page);
        debug!(
            page = page,
            last_page = last_page,
            records = current.records.len(),
            "Fetched listing page"
        );
        records.extend(current.records);

        if last_page <= page {
            break;
        }
        if page >= options.max_pages {
            // A partial snapshot would turn existing dates into duplicate creates.
            warn!(
                page = page,
                last_page = last_page,
                max_pages = options.max_pages,
                "Listing exceeds page limit"
            );
            return Err(DiaryError::Fetch(format!(
                "listing reports {last_page} pages, more than max_pages = {}",
                options.max_pages
            )));
        }

        page += 1;
        if !options.page_delay.is_zero() {
            std::thread::sleep(options.page_delay);
        }
    }

    info!(records = records.len(), pages = page, "Fetched existing entries");
    Ok(records)
}
