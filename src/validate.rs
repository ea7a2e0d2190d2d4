//! Entry validation against the skill table.

use crate::entry::DiaryEntry;
use crate::error::Result;
use crate::skills::{SkillId, SkillResolver};

/// Resolve every skill of `entry`, in order.
///
/// Stops at the first unknown name; the error carries that name.
pub fn validate(entry: &DiaryEntry, resolver: &SkillResolver) -> Result<Vec<SkillId>> {
    entry
        .skills
        .iter()
        .map(|name| resolver.resolve(name))
        .collect()
}

/// Validate all entries up front so nothing is sent when any entry is bad.
pub fn validate_all(entries: &[DiaryEntry], resolver: &SkillResolver) -> Result<()> {
    for entry in entries {
        if let Err(err) = validate(entry, resolver) {
            tracing::error!(date = %entry.date, error = %err, "Entry failed validation");
            return Err(err);
        }
    }
    Ok(())
}
