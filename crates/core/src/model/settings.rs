use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::operation::OperationConfig;

/// Allowed session lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SessionLength {
    Short,
    #[default]
    Standard,
    Long,
}

impl SessionLength {
    #[must_use]
    pub fn from_secs(secs: u32) -> Option<Self> {
        match secs {
            30 => Some(Self::Short),
            60 => Some(Self::Standard),
            120 => Some(Self::Long),
            _ => None,
        }
    }

    #[must_use]
    pub fn secs(self) -> u32 {
        match self {
            Self::Short => 30,
            Self::Standard => 60,
            Self::Long => 120,
        }
    }
}

impl TryFrom<u32> for SessionLength {
    type Error = SettingsError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::from_secs(secs).ok_or(SettingsError::InvalidLength { secs })
    }
}

impl From<SessionLength> for u32 {
    fn from(length: SessionLength) -> Self {
        length.secs()
    }
}

impl fmt::Display for SessionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("session length must be 30, 60 or 120 seconds, got {secs}")]
    InvalidLength { secs: u32 },
}

/// Everything a session reads once at start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PracticeSettings {
    operations: OperationConfig,
    length: SessionLength,
}

/// Unvalidated settings as edited by a caller.
#[derive(Debug, Clone, Default)]
pub struct SettingsDraft {
    pub operations: Option<OperationConfig>,
    pub length_secs: Option<u32>,
}

impl SettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a draft from existing settings.
    #[must_use]
    pub fn from_settings(settings: &PracticeSettings) -> Self {
        Self {
            operations: Some(settings.operations.clone()),
            length_secs: Some(settings.length.secs()),
        }
    }

    /// Validate the draft; missing parts take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidLength` if the length is not 30, 60 or 120.
    pub fn validate(self) -> Result<PracticeSettings, SettingsError> {
        let length = match self.length_secs {
            Some(secs) => SessionLength::try_from(secs)?,
            None => SessionLength::default(),
        };
        Ok(PracticeSettings {
            operations: self.operations.unwrap_or_default(),
            length,
        })
    }
}

impl PracticeSettings {
    #[must_use]
    pub fn new(operations: OperationConfig, length: SessionLength) -> Self {
        Self { operations, length }
    }

    #[must_use]
    pub fn operations(&self) -> &OperationConfig {
        &self.operations
    }

    #[must_use]
    pub fn length(&self) -> SessionLength {
        self.length
    }
}
