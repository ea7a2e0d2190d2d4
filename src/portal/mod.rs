//! InternYet portal boundary.
//!
//! - [`auth`]: login and the authenticated [`PortalSession`]
//! - [`fetch`]: paging through existing diary entries
//! - [`DiaryPortal`]: the seam the fetcher and submission engine talk to

pub mod auth;
pub mod fetch;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::payload::SubmissionPayload;

pub use auth::{Credentials, PortalClient, PortalSession};
pub use fetch::{FetchOptions, fetch_all};

/// Remote identifier of an existing diary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub i64);

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A diary record as returned by the portal, kept verbatim for backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteEntryRecord(pub Map<String, Value>);

impl RemoteEntryRecord {
    /// Record id; the portal sends numbers but numeric strings are accepted.
    #[must_use]
    pub fn id(&self) -> Option<RemoteId> {
        match self.0.get("id")? {
            Value::Number(n) => n.as_i64().map(RemoteId),
            Value::String(s) => s.trim().parse().ok().map(RemoteId),
            _ => None,
        }
    }

    /// Calendar date of the record. Only the `YYYY-MM-DD` prefix is read, so
    /// full timestamps work too.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.0.get("date")?.as_str()?;
        let prefix = raw.get(..10)?;
        prefix.parse().ok()
    }
}

/// One page of the listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct EntryPage {
    pub records: Vec<RemoteEntryRecord>,
    /// `None` when the portal omits it; the current page is then the last.
    pub last_page: Option<u32>,
}

/// Listing envelope: `{"data": {"data": [...], "last_page": N}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingResponse {
    #[serde(default)]
    pub data: ListingBlock,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingBlock {
    #[serde(default)]
    pub data: Vec<RemoteEntryRecord>,
    #[serde(default)]
    pub last_page: Option<u32>,
}

impl From<ListingResponse> for EntryPage {
    fn from(response: ListingResponse) -> Self {
        Self {
            records: response.data.data,
            last_page: response.data.last_page,
        }
    }
}

/// Operations the run needs from the portal.
pub trait DiaryPortal {
    /// Fetch one page (1-based) of existing entries.
    fn fetch_page(&self, page: u32) -> Result<EntryPage>;

    /// Send one create-or-update request.
    ///
    /// Returns `Submission` for a status outside 200/201 and `Transport`
    /// when no response arrived.
    fn submit(&self, payload: &SubmissionPayload) -> Result<()>;
}
