//! REST implementation of [`CommandStore`].
//!
//! Endpoints (relative to `ClientConfig::api_url`):
//!
//! ```text
//! GET    /v1/studies/{study}/commands
//! POST   /v1/studies/{study}/commands                 body: [command] -> [id]
//! PUT    /v1/studies/{study}/commands/{id}            body: command
//! PUT    /v1/studies/{study}/commands/{id}/move?index={i}
//! DELETE /v1/studies/{study}/commands/{id}
//! ```
//!
//! Path segments are percent-encoded, so ids never alter the route.
//!
//! No retries: a failed request is reported once and left to the caller.

use gridstudy_core::{CommandId, StudyId};
use reqwest::{RequestBuilder, Response, StatusCode, Url};

use crate::command::Command;
use crate::config::ClientConfig;
use crate::store::{CommandStore, StoreError};

/// HTTP client for the study backend's command endpoints.
#[derive(Debug, Clone)]
pub struct HttpCommandStore {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpCommandStore {
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {e}")))?;

        let base = Url::parse(&config.api_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.api_url)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.api_url.clone()));
        }

        Ok(Self {
            client,
            base,
            token: config.token.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// `{base}/v1/studies/{study}/commands/{tail..}`, one encoded segment each.
    fn endpoint(&self, study: &StudyId, tail: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["v1", "studies", study.as_str(), "commands"])
            .extend(tail);
        Ok(url)
    }

    fn commands_url(&self, study: &StudyId) -> Result<Url, StoreError> {
        self.endpoint(study, &[])
    }

    fn command_url(&self, study: &StudyId, id: &CommandId) -> Result<Url, StoreError> {
        self.endpoint(study, &[id.as_str()])
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(
        &self,
        req: RequestBuilder,
        id: Option<&CommandId>,
    ) -> Result<Response, StoreError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
            return Err(StoreError::CommandNotFound(id.clone()));
        }

        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Api(status.as_u16(), body))
    }
}

#[async_trait::async_trait]
impl CommandStore for HttpCommandStore {
    async fn list(&self, study: &StudyId) -> Result<Vec<Command>, StoreError> {
        let resp = self.send(self.client.get(self.commands_url(study)?), None).await?;
        resp.json::<Vec<Command>>()
            .await
            .map_err(|e| StoreError::Parse(format!("failed to parse command list: {e}")))
    }

    async fn append(&self, study: &StudyId, command: &Command) -> Result<CommandId, StoreError> {
        let body = [command.detached()];
        let req = self.client.post(self.commands_url(study)?).json(&body);
        let ids: Vec<CommandId> = self
            .send(req, None)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Parse(format!("failed to parse created ids: {e}")))?;

        let id = ids.into_iter().next().ok_or_else(|| {
            StoreError::Parse("backend returned no id for appended command".into())
        })?;

        tracing::debug!(
            study = %study,
            command_id = %id,
            action = %command.action,
            "command appended"
        );
        Ok(id)
    }

    async fn update(
        &self,
        study: &StudyId,
        id: &CommandId,
        command: &Command,
    ) -> Result<(), StoreError> {
        let body = command.clone().with_id(id.clone());
        let req = self.client.put(self.command_url(study, id)?).json(&body);
        self.send(req, Some(id)).await?;
        tracing::debug!(study = %study, command_id = %id, "command updated");
        Ok(())
    }

    async fn move_to(
        &self,
        study: &StudyId,
        id: &CommandId,
        index: usize,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(study, &[id.as_str(), "move"])?;
        let req = self.client.put(url).query(&[("index", index)]);
        self.send(req, Some(id)).await?;
        tracing::debug!(study = %study, command_id = %id, index, "command moved");
        Ok(())
    }

    async fn delete(&self, study: &StudyId, id: &CommandId) -> Result<(), StoreError> {
        let req = self.client.delete(self.command_url(study, id)?);
        self.send(req, Some(id)).await?;
        tracing::debug!(study = %study, command_id = %id, "command deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builds_command_urls() {
        let store = HttpCommandStore::new(
            &ClientConfig::new("http://host/api/").with_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        let study = StudyId::new_unchecked("s1");
        let id = CommandId::new_unchecked("c1");

        assert_eq!(store.api_url(), "http://host/api");
        assert_eq!(
            store.commands_url(&study).unwrap().as_str(),
            "http://host/api/v1/studies/s1/commands"
        );
        assert_eq!(
            store.command_url(&study, &id).unwrap().as_str(),
            "http://host/api/v1/studies/s1/commands/c1"
        );
        assert_eq!(
            store.endpoint(&study, &["c1", "move"]).unwrap().as_str(),
            "http://host/api/v1/studies/s1/commands/c1/move"
        );
    }

    #[test]
    fn encodes_reserved_characters_in_ids() {
        let store = HttpCommandStore::new(&ClientConfig::new("http://host")).unwrap();
        let study = StudyId::new_unchecked("s 1");
        let id = CommandId::new_unchecked("a/b?c#d%");

        assert_eq!(store.api_url(), "http://host");
        assert_eq!(
            store.command_url(&study, &id).unwrap().as_str(),
            "http://host/v1/studies/s%201/commands/a%2Fb%3Fc%23d%25"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            HttpCommandStore::new(&ClientConfig::new("not a url")),
            Err(StoreError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpCommandStore::new(&ClientConfig::new("mailto:ops@example.org")),
            Err(StoreError::InvalidUrl(_))
        ));
    }
}
