use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DiaryError, Result};

/// File picked up from the working directory when no explicit config is given.
pub const DEFAULT_CONFIG_FILE: &str = "diary-sync.toml";

/// Below this spacing between writes the portal has been seen to throttle.
pub const RECOMMENDED_MIN_REQUEST_DELAY_MS: u64 = 2_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub submit: SubmitConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
}

impl Config {
    /// Load defaults, then the TOML file, then `DIARY_SYNC_*` overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment.
    pub fn load_with<F>(explicit_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("DIARY_SYNC_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DiaryError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else if let Some(patch) = Self::load_patch(Path::new(DEFAULT_CONFIG_FILE))? {
            config.merge_patch(patch);
        }

        config.apply_env_overrides(&env)?;
        config.validate()?;

        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| DiaryError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| DiaryError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.portal {
            self.portal.merge(patch);
        }
        if let Some(patch) = patch.submit {
            self.submit.merge(patch);
        }
        if let Some(patch) = patch.fetch {
            self.fetch.merge(patch);
        }
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.skills {
            self.skills.merge(patch);
        }
    }

    fn apply_env_overrides<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env("DIARY_SYNC_BASE_URL") {
            self.portal.base_url = value;
        }
        if let Some(value) = env("DIARY_SYNC_ORIGIN") {
            self.portal.origin = value;
        }
        if let Some(value) = env_parse::<u32, F>(env, "DIARY_SYNC_INTERNSHIP_ID")? {
            self.portal.internship_id = value;
        }
        if let Some(value) = env_parse::<u8, F>(env, "DIARY_SYNC_MOOD")? {
            self.portal.mood = value;
        }
        if let Some(value) = env_parse::<u64, F>(env, "DIARY_SYNC_TIMEOUT_SECS")? {
            self.portal.timeout_secs = value;
        }

        if let Some(value) = env_parse::<u64, F>(env, "DIARY_SYNC_REQUEST_DELAY_MS")? {
            self.submit.request_delay_ms = value;
        }
        if let Some(value) = env_parse::<u32, F>(env, "DIARY_SYNC_MAX_ATTEMPTS")? {
            self.submit.max_attempts = value;
        }
        if let Some(value) = env_parse::<u64, F>(env, "DIARY_SYNC_RETRY_DELAY_MS")? {
            self.submit.retry_delay_ms = value;
        }
        if let Some(value) = env_parse::<f64, F>(env, "DIARY_SYNC_RETRY_BACKOFF")? {
            self.submit.retry_backoff = value;
        }
        if let Some(value) = env("DIARY_SYNC_ON_INVALID_SKILL") {
            self.submit.on_invalid_skill = InvalidSkillPolicy::parse(&value)?;
        }

        if let Some(value) = env_parse::<u64, F>(env, "DIARY_SYNC_PAGE_DELAY_MS")? {
            self.fetch.page_delay_ms = value;
        }
        if let Some(value) = env_parse::<u32, F>(env, "DIARY_SYNC_MAX_PAGES")? {
            self.fetch.max_pages = value;
        }

        if let Some(value) = env("DIARY_SYNC_ENTRIES") {
            self.paths.entries = PathBuf::from(value);
        }
        if let Some(value) = env("DIARY_SYNC_BACKUP_DIR") {
            self.paths.backup_dir = PathBuf::from(value);
        }
        if let Some(value) = env("DIARY_SYNC_SKILLS_TABLE") {
            self.skills.table = Some(PathBuf::from(value));
        }

        Ok(())
    }

    /// Reject values that would make a run unbounded or meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.portal.base_url.trim().is_empty() {
            return Err(DiaryError::Config("portal.base_url is empty".to_string()));
        }
        if self.submit.max_attempts == 0 {
            return Err(DiaryError::Config(
                "submit.max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.submit.retry_backoff.is_finite() || self.submit.retry_backoff < 1.0 {
            return Err(DiaryError::Config(format!(
                "submit.retry_backoff must be >= 1.0, got {}",
                self.submit.retry_backoff
            )));
        }
        if self.fetch.max_pages == 0 {
            return Err(DiaryError::Config(
                "fetch.max_pages must be at least 1".to_string(),
            ));
        }
        for warning in self.pacing_warnings() {
            tracing::warn!(
                recommended_ms = RECOMMENDED_MIN_REQUEST_DELAY_MS,
                "{warning}; the portal may rate-limit"
            );
        }
        Ok(())
    }

    /// Pacing values that are accepted but below the recommended minimum.
    #[must_use]
    pub fn pacing_warnings(&self) -> Vec<String> {
        [
            ("submit.request_delay_ms", self.submit.request_delay_ms),
            ("submit.retry_delay_ms", self.submit.retry_delay_ms),
        ]
        .into_iter()
        .filter(|(_, value)| *value < RECOMMENDED_MIN_REQUEST_DELAY_MS)
        .map(|(key, value)| format!("{key} = {value} is below {RECOMMENDED_MIN_REQUEST_DELAY_MS}"))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub base_url: String,
    pub origin: String,
    pub internship_id: u32,
    pub mood: u8,
    pub timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vtuapi.internyet.in/api/v1".to_string(),
            origin: "https://vtu.internyet.in".to_string(),
            internship_id: 702,
            mood: 5,
            timeout_secs: 15,
        }
    }
}

impl PortalConfig {
    fn merge(&mut self, patch: PortalPatch) {
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
        if let Some(value) = patch.origin {
            self.origin = value;
        }
        if let Some(value) = patch.internship_id {
            self.internship_id = value;
        }
        if let Some(value) = patch.mood {
            self.mood = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What to do when an entry names a skill outside the lookup table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidSkillPolicy {
    /// Abort the whole run before anything is submitted.
    #[default]
    Fail,
    /// Record the entry as failed and move on.
    Skip,
}

impl InvalidSkillPolicy {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            other => Err(DiaryError::Config(format!(
                "invalid DIARY_SYNC_ON_INVALID_SKILL value {other}: expected fail or skip"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    pub request_delay_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub retry_backoff: f64,
    #[serde(default)]
    pub on_invalid_skill: InvalidSkillPolicy,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 5_000,
            max_attempts: 3,
            retry_delay_ms: 2_000,
            retry_backoff: 1.0,
            on_invalid_skill: InvalidSkillPolicy::Fail,
        }
    }
}

impl SubmitConfig {
    fn merge(&mut self, patch: SubmitPatch) {
        if let Some(value) = patch.request_delay_ms {
            self.request_delay_ms = value;
        }
        if let Some(value) = patch.max_attempts {
            self.max_attempts = value;
        }
        if let Some(value) = patch.retry_delay_ms {
            self.retry_delay_ms = value;
        }
        if let Some(value) = patch.retry_backoff {
            self.retry_backoff = value;
        }
        if let Some(value) = patch.on_invalid_skill {
            self.on_invalid_skill = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub page_delay_ms: u64,
    pub max_pages: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 500,
            max_pages: 1_000,
        }
    }
}

impl FetchConfig {
    fn merge(&mut self, patch: FetchPatch) {
        if let Some(value) = patch.page_delay_ms {
            self.page_delay_ms = value;
        }
        if let Some(value) = patch.max_pages {
            self.max_pages = value;
        }
    }

    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub entries: PathBuf,
    pub backup_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            entries: PathBuf::from("entries.json"),
            backup_dir: PathBuf::from("."),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.entries {
            self.entries = value;
        }
        if let Some(value) = patch.backup_dir {
            self.backup_dir = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Replaces the built-in skill table when set.
    #[serde(default)]
    pub table: Option<PathBuf>,
}

impl SkillsConfig {
    fn merge(&mut self, patch: SkillsPatch) {
        if patch.table.is_some() {
            self.table = patch.table;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub portal: Option<PortalPatch>,
    pub submit: Option<SubmitPatch>,
    pub fetch: Option<FetchPatch>,
    pub paths: Option<PathsPatch>,
    pub skills: Option<SkillsPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PortalPatch {
    pub base_url: Option<String>,
    pub origin: Option<String>,
    pub internship_id: Option<u32>,
    pub mood: Option<u8>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SubmitPatch {
    pub request_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub retry_backoff: Option<f64>,
    pub on_invalid_skill: Option<InvalidSkillPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FetchPatch {
    pub page_delay_ms: Option<u64>,
    pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub entries: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SkillsPatch {
    pub table: Option<PathBuf>,
}

fn env_parse<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| DiaryError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}
