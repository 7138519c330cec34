//! Settings and history stored as JSON values under fixed keys of a [`KeyValueStore`].
//!
//! Unreadable values are logged and treated as absent so a damaged store never blocks
//! a session from starting.

use async_trait::async_trait;
use drill_core::model::{
    DigitRange, OperationConfig, OperationKind, PracticeSettings, SessionLength, SessionSummary,
    dedupe_and_cap, merge_into_history,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::repository::{HistoryRepository, KeyValueStore, SettingsRepository, StorageError};

pub const OPS_KEY: &str = "ops";
pub const DIGITS_KEY: &str = "digits";
pub const LENGTH_KEY: &str = "lengthSec";
pub const SUMMARIES_KEY: &str = "summaries";
pub const LAST_SUMMARY_KEY: &str = "lastSummary";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredRange {
    min: u8,
    max: u8,
}

impl From<StoredRange> for DigitRange {
    fn from(range: StoredRange) -> Self {
        DigitRange::new(range.min, range.max)
    }
}

impl From<DigitRange> for StoredRange {
    fn from(range: DigitRange) -> Self {
        Self {
            min: range.min(),
            max: range.max(),
        }
    }
}

/// One entry of the `digits` map.
///
/// Older stores hold a bare digit count or a single range shared by both operands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredDigits {
    Split {
        first: StoredRange,
        second: StoredRange,
    },
    Shared(StoredRange),
    Legacy(u8),
}

impl StoredDigits {
    fn ranges(self) -> (DigitRange, DigitRange) {
        match self {
            StoredDigits::Split { first, second } => (first.into(), second.into()),
            StoredDigits::Shared(range) => (range.into(), range.into()),
            StoredDigits::Legacy(digits) => {
                (DigitRange::single(digits), DigitRange::single(digits))
            }
        }
    }
}

/// Parse a JSON value, logging and discarding it when malformed.
fn parse_or_warn<T: for<'de> Deserialize<'de>>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "ignoring malformed stored value");
            None
        }
    }
}

fn parse_length(raw: &str) -> SessionLength {
    let secs = raw.trim().trim_matches('"').parse::<u32>().ok();
    match secs.and_then(SessionLength::from_secs) {
        Some(length) => length,
        None => {
            warn!(raw, "invalid stored session length, using default");
            SessionLength::default()
        }
    }
}

fn apply_ops(config: &mut OperationConfig, ops: BTreeMap<String, bool>) {
    for (key, enabled) in ops {
        match OperationKind::from_key(&key) {
            Some(kind) => config.set_enabled(kind, enabled),
            None => debug!(key = %key, "skipping unknown operation"),
        }
    }
}

fn apply_digits(config: &mut OperationConfig, digits: BTreeMap<String, StoredDigits>) {
    for (key, stored) in digits {
        if let Some(kind) = OperationKind::from_key(&key) {
            let (first, second) = stored.ranges();
            config.set_digits(kind, first, second);
        }
    }
}

/// Settings as one JSON object: `{"ops": {..}, "digits": {..}, "lengthSec": 60}`.
///
/// The same three values the keyed layout spreads over separate keys; remote stores
/// keep them in a single per-user document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(default)]
    ops: BTreeMap<String, bool>,
    #[serde(default)]
    digits: BTreeMap<String, StoredDigits>,
    #[serde(default)]
    length_sec: Option<serde_json::Value>,
}

impl SettingsDocument {
    #[must_use]
    pub fn from_settings(settings: &PracticeSettings) -> Self {
        let config = settings.operations();
        let mut ops = BTreeMap::new();
        let mut digits = BTreeMap::new();
        for kind in OperationKind::ALL {
            let entry = config.settings_for(kind);
            ops.insert(kind.key().to_owned(), entry.enabled);
            digits.insert(
                kind.key().to_owned(),
                StoredDigits::Split {
                    first: entry.first_operand_digits.into(),
                    second: entry.second_operand_digits.into(),
                },
            );
        }
        Self {
            ops,
            digits,
            length_sec: Some(serde_json::Value::from(settings.length().secs())),
        }
    }

    /// Settings with defaults for whatever the document lacks or holds invalid.
    #[must_use]
    pub fn into_settings(self) -> PracticeSettings {
        let mut config = OperationConfig::default();
        apply_ops(&mut config, self.ops);
        apply_digits(&mut config, self.digits);
        let length = match self.length_sec {
            Some(serde_json::Value::String(raw)) => parse_length(&raw),
            Some(value) => parse_length(&value.to_string()),
            None => SessionLength::default(),
        };
        PracticeSettings::new(config, length)
    }
}

/// Practice settings spread over the `ops`, `digits` and `lengthSec` keys.
#[derive(Clone)]
pub struct KeyedSettings {
    kv: Arc<dyn KeyValueStore>,
}

impl KeyedSettings {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl SettingsRepository for KeyedSettings {
    async fn get_settings(&self) -> Result<Option<PracticeSettings>, StorageError> {
        let ops = self.kv.get(OPS_KEY).await?;
        let digits = self.kv.get(DIGITS_KEY).await?;
        let length = self.kv.get(LENGTH_KEY).await?;
        if ops.is_none() && digits.is_none() && length.is_none() {
            return Ok(None);
        }

        let mut config = OperationConfig::default();
        if let Some(map) = ops
            .as_deref()
            .and_then(|raw| parse_or_warn::<BTreeMap<String, bool>>(OPS_KEY, raw))
        {
            apply_ops(&mut config, map);
        }
        if let Some(map) = digits
            .as_deref()
            .and_then(|raw| parse_or_warn::<BTreeMap<String, StoredDigits>>(DIGITS_KEY, raw))
        {
            apply_digits(&mut config, map);
        }
        let length = length
            .as_deref()
            .map_or_else(SessionLength::default, parse_length);

        Ok(Some(PracticeSettings::new(config, length)))
    }

    async fn save_settings(&self, settings: &PracticeSettings) -> Result<(), StorageError> {
        let document = SettingsDocument::from_settings(settings);
        self.kv
            .set(OPS_KEY, &serde_json::to_string(&document.ops).map_err(ser)?)
            .await?;
        self.kv
            .set(DIGITS_KEY, &serde_json::to_string(&document.digits).map_err(ser)?)
            .await?;
        self.kv
            .set(LENGTH_KEY, &settings.length().secs().to_string())
            .await?;
        debug!(length = settings.length().secs(), "settings saved");
        Ok(())
    }
}

// ─── History ──────────────────────────────────────────────────────────────────

/// Capped history under `summaries` plus the latest entry under `lastSummary`.
#[derive(Clone)]
pub struct KeyedHistory {
    kv: Arc<dyn KeyValueStore>,
}

impl KeyedHistory {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Every readable stored summary; entries that fail validation are skipped.
    async fn read_all(&self) -> Result<Vec<SessionSummary>, StorageError> {
        let Some(raw) = self.kv.get(SUMMARIES_KEY).await? else {
            return Ok(Vec::new());
        };
        let Some(values) = parse_or_warn::<Vec<serde_json::Value>>(SUMMARIES_KEY, &raw) else {
            return Ok(Vec::new());
        };

        let mut summaries = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<SessionSummary>(value) {
                Ok(summary) => summaries.push(summary),
                Err(err) => warn!(error = %err, "skipping unreadable stored summary"),
            }
        }
        Ok(summaries)
    }

    async fn write_all(&self, summaries: &[SessionSummary]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(summaries).map_err(ser)?;
        self.kv.set(SUMMARIES_KEY, &raw).await
    }

    async fn write_last(&self, summary: Option<&SessionSummary>) -> Result<(), StorageError> {
        match summary {
            Some(summary) => {
                let raw = serde_json::to_string(summary).map_err(ser)?;
                self.kv.set(LAST_SUMMARY_KEY, &raw).await
            }
            None => self.kv.remove(LAST_SUMMARY_KEY).await,
        }
    }
}

#[async_trait]
impl HistoryRepository for KeyedHistory {
    async fn append(&self, summary: &SessionSummary) -> Result<(), StorageError> {
        let existing = self.read_all().await?;
        if existing.iter().any(|stored| stored.id() == summary.id()) {
            debug!(id = %summary.id(), "summary already stored");
            return Ok(());
        }
        let history = merge_into_history(existing, summary.clone());
        self.write_all(&history).await?;
        self.write_last(Some(summary)).await?;
        debug!(id = %summary.id(), len = history.len(), "summary appended");
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<SessionSummary>, StorageError> {
        let mut history = dedupe_and_cap(self.read_all().await?);
        history.truncate(limit);
        Ok(history)
    }

    async fn latest(&self) -> Result<Option<SessionSummary>, StorageError> {
        if let Some(raw) = self.kv.get(LAST_SUMMARY_KEY).await? {
            if let Some(summary) = parse_or_warn::<SessionSummary>(LAST_SUMMARY_KEY, &raw) {
                return Ok(Some(summary));
            }
        }
        Ok(self.read_all().await?.into_iter().next())
    }

    async fn replace_all(&self, summaries: &[SessionSummary]) -> Result<(), StorageError> {
        let history = dedupe_and_cap(summaries.to_vec());
        self.write_all(&history).await?;
        self.write_last(history.first()).await
    }
}
