//! Skill name → portal skill id lookup.
//!
//! The table is data, not code: the built-in copy is embedded from
//! `default_skills.toml`, and `[skills] table` in the config can point at a
//! replacement file with the same shape.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiaryError, Result};

const DEFAULT_TABLE: &str = include_str!("default_skills.toml");

/// Portal-internal identifier of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub u32);

#[derive(Debug, Deserialize)]
struct SkillTable {
    skills: BTreeMap<String, u32>,
}

/// Immutable lookup table, loaded once per run.
#[derive(Debug, Clone)]
pub struct SkillResolver {
    table: BTreeMap<String, SkillId>,
}

impl SkillResolver {
    /// The table shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(DEFAULT_TABLE)
    }

    /// Use `path` when given, otherwise the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let raw = std::fs::read_to_string(path).map_err(|err| {
            DiaryError::Config(format!("read skill table {}: {err}", path.display()))
        })?;
        let resolver = Self::from_toml(&raw).map_err(|err| {
            DiaryError::Config(format!("skill table {}: {err}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), skills = resolver.len(), "Loaded custom skill table");
        Ok(resolver)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let parsed: SkillTable = toml::from_str(raw)
            .map_err(|err| DiaryError::Config(format!("parse skill table: {err}")))?;
        if parsed.skills.is_empty() {
            return Err(DiaryError::Config("skill table is empty".to_string()));
        }
        Ok(Self::from_pairs(parsed.skills))
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let table = pairs
            .into_iter()
            .map(|(name, id)| (name.into(), SkillId(id)))
            .collect();
        Self { table }
    }

    /// Resolve one skill name. Names are case-sensitive.
    pub fn resolve(&self, name: &str) -> Result<SkillId> {
        self.table
            .get(name)
            .copied()
            .ok_or_else(|| DiaryError::InvalidSkill(name.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_table_loads() {
        let resolver = SkillResolver::builtin().unwrap();
        assert_eq!(resolver.len(), 86);
    }

    #[test]
    fn resolves_known_names() {
        let resolver = SkillResolver::builtin().unwrap();
        assert_eq!(resolver.resolve("JavaScript").unwrap(), SkillId(1));
        assert_eq!(resolver.resolve("Python").unwrap(), SkillId(3));
        assert_eq!(resolver.resolve("C++").unwrap(), SkillId(11));
        assert_eq!(resolver.resolve("TCP/IP").unwrap(), SkillId(46));
        assert_eq!(
            resolver
                .resolve("3D PRINTING CONCEPTS, DESIGN AND PRINTING")
                .unwrap(),
            SkillId(85)
        );
    }

    #[test]
    fn unknown_name_is_reported_verbatim() {
        let resolver = SkillResolver::builtin().unwrap();
        let err = resolver.resolve("Rust").unwrap_err();
        assert!(matches!(err, DiaryError::InvalidSkill(ref name) if name == "Rust"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let resolver = SkillResolver::builtin().unwrap();
        assert!(resolver.resolve("Computer vision").is_err());
        assert!(resolver.resolve("computer vision").is_ok());
    }

    #[test]
    fn custom_table_replaces_builtin() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("skills.toml");
        std::fs::write(&path, "[skills]\n\"Rust\" = 99\n").unwrap();

        let resolver = SkillResolver::load(Some(&path)).unwrap();
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.resolve("Rust").unwrap(), SkillId(99));
        assert!(resolver.resolve("Python").is_err());
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(SkillResolver::from_toml("[skills]\n").is_err());
    }

    #[test]
    fn skill_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&SkillId(42)).unwrap(), "42");
    }
}
