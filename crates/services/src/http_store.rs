use async_trait::async_trait;
use drill_core::model::{PracticeSettings, SessionSummary};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use storage::keyed::SettingsDocument;
use storage::remote::RemoteDocumentStore;
use storage::repository::StorageError;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpStoreConfig {
    pub base_url: String,
    pub token: Option<String>,
}

/// Remote document store reachable over HTTP.
///
/// Documents live at `{base_url}/users/{user}/sessions/{summary id}`; settings at
/// `{base_url}/users/{user}/settings`.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    config: HttpStoreConfig,
}

fn conn(err: reqwest::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

fn ensure_success(response: &Response) -> Result<(), StorageError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(StorageError::Connection(format!(
            "remote store returned {}",
            response.status()
        )))
    }
}

impl HttpDocumentStore {
    #[must_use]
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn sessions_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{user_id}/sessions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn settings_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{user_id}/settings",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl RemoteDocumentStore for HttpDocumentStore {
    async fn put_session(
        &self,
        user_id: &str,
        summary: &SessionSummary,
    ) -> Result<(), StorageError> {
        let url = format!("{}/{}", self.sessions_url(user_id), summary.id());
        let response = self
            .authorize(self.client.put(url))
            .json(summary)
            .send()
            .await
            .map_err(conn)?;
        ensure_success(&response)?;
        debug!(id = %summary.id(), "session document stored");
        Ok(())
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionSummary>, StorageError> {
        let response = self
            .authorize(self.client.get(self.sessions_url(user_id)))
            .query(&[
                ("orderBy", "startedAt".to_string()),
                ("direction", "desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(conn)?;
        ensure_success(&response)?;

        let mut sessions: Vec<SessionSummary> = response
            .json()
            .await
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        sessions.sort_by(|a, b| b.started_at().cmp(&a.started_at()));
        sessions.truncate(limit);
        Ok(sessions)
    }

    async fn put_settings(
        &self,
        user_id: &str,
        settings: &PracticeSettings,
    ) -> Result<(), StorageError> {
        let response = self
            .authorize(self.client.put(self.settings_url(user_id)))
            .json(&SettingsDocument::from_settings(settings))
            .send()
            .await
            .map_err(conn)?;
        ensure_success(&response)?;
        debug!(user = user_id, "settings document stored");
        Ok(())
    }

    async fn get_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<PracticeSettings>, StorageError> {
        let response = self
            .authorize(self.client.get(self.settings_url(user_id)))
            .send()
            .await
            .map_err(conn)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ensure_success(&response)?;

        let document: SettingsDocument = response
            .json()
            .await
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(Some(document.into_settings()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_urls_ignore_trailing_slash() {
        let store = HttpDocumentStore::new(HttpStoreConfig {
            base_url: "https://drill.example/api/".into(),
            token: None,
        });
        assert_eq!(
            store.sessions_url("ada"),
            "https://drill.example/api/users/ada/sessions"
        );
        assert_eq!(
            store.settings_url("ada"),
            "https://drill.example/api/users/ada/settings"
        );
    }

    #[tokio::test]
    async fn unreachable_remote_is_a_connection_error() {
        let store = HttpDocumentStore::new(HttpStoreConfig {
            base_url: "http://127.0.0.1:9".into(),
            token: Some("t".into()),
        });
        let err = store.list_sessions("ada", 5).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
        let err = store.get_settings("ada").await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }
}
