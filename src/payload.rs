//! Wire payload for the create-or-update endpoint.

use chrono::NaiveDate;
use serde::Serialize;

use crate::entry::DiaryEntry;
use crate::portal::RemoteId;
use crate::reconcile::ReconciliationIndex;
use crate::skills::SkillId;

/// Whether the portal will create a new record or overwrite an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Update,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("CREATE"),
            Self::Update => f.write_str("UPDATE"),
        }
    }
}

/// Per-run constants stamped on every payload.
#[derive(Debug, Clone, Copy)]
pub struct PayloadDefaults {
    pub internship_id: u32,
    pub mood: u8,
}

impl From<&crate::config::PortalConfig> for PayloadDefaults {
    fn from(config: &crate::config::PortalConfig) -> Self {
        Self {
            internship_id: config.internship_id,
            mood: config.mood,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub internship_id: u32,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub description: String,
    pub hours: serde_json::Number,
    pub blockers: String,
    pub learnings: String,
    pub links: String,
    pub mood_slider: u8,
    pub skill_ids: Vec<SkillId>,
    /// Present only for updates; its presence is what makes the portal update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
}

impl SubmissionPayload {
    /// Build the payload for `entry`, attaching the remote id on a date match.
    #[must_use]
    pub fn build(
        entry: &DiaryEntry,
        skill_ids: Vec<SkillId>,
        index: &ReconciliationIndex,
        defaults: PayloadDefaults,
    ) -> Self {
        Self {
            internship_id: defaults.internship_id,
            date: entry.date,
            description: entry.work_summary.clone(),
            hours: entry.hours.clone(),
            blockers: entry.blockers.clone(),
            learnings: entry.learnings.clone(),
            links: String::new(),
            mood_slider: defaults.mood,
            skill_ids,
            id: index.get(entry.date),
        }
    }

    #[must_use]
    pub const fn action(&self) -> Action {
        if self.id.is_some() {
            Action::Update
        } else {
            Action::Create
        }
    }
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }
}
