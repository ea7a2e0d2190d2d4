//! Date → remote id index used to decide create vs update.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::portal::{RemoteEntryRecord, RemoteId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationIndex {
    by_date: HashMap<NaiveDate, RemoteId>,
}

impl ReconciliationIndex {
    /// An index with no remote records; every entry is a create.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from fetched records.
    ///
    /// Records without a readable id or date are left out. When two records
    /// share a date the later one wins and a warning names both ids.
    #[must_use]
    pub fn build(records: &[RemoteEntryRecord]) -> Self {
        let mut by_date = HashMap::with_capacity(records.len());
        let mut skipped = 0usize;

        for record in records {
            let (Some(date), Some(id)) = (record.date(), record.id()) else {
                skipped += 1;
                continue;
            };
            if let Some(previous) = by_date.insert(date, id) {
                if previous != id {
                    warn!(
                        date = %date,
                        kept = %id,
                        dropped = %previous,
                        "Portal has more than one entry for this date"
                    );
                }
            }
        }

        if skipped > 0 {
            warn!(skipped = skipped, "Ignored remote records without id or date");
        }
        debug!(dates = by_date.len(), "Built reconciliation index");
        Self { by_date }
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<RemoteId> {
        self.by_date.get(&date).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
