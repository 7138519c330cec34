use std::sync::Arc;

use drill_core::model::{PracticeSettings, SettingsDraft};
use storage::repository::SettingsRepository;
use tracing::warn;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings, or defaults if missing or unreadable.
    ///
    /// Never fails: a broken store must not keep a session from starting.
    pub async fn load(&self) -> PracticeSettings {
        match self.repo.get_settings().await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "failed to load settings, using defaults");
                PracticeSettings::default()
            }
        }
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        draft: SettingsDraft,
    ) -> Result<PracticeSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }
}
