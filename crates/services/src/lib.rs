#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod history_service;
pub mod http_store;
pub mod practice_service;
pub mod settings_service;
pub mod sync;

pub use drill_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, HistoryError, SettingsServiceError, SyncError};
pub use history_service::HistoryService;
pub use http_store::{HttpDocumentStore, HttpStoreConfig};
pub use practice_service::{PracticeService, Recorded};
pub use settings_service::SettingsService;
pub use sync::{RemoteAccount, SyncReport, SyncService};
