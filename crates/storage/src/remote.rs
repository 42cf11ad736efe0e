//! Read-only client for a PostgREST-style hosted store.
//!
//! Levels live in `pathway_levels`, completions in
//! `pathway_level_completions`. Both are queried over HTTP with the project
//! key sent as `apikey` and bearer token.

use std::env;

use async_trait::async_trait;
use pathway_core::model::{CompletionRecord, LevelDefinition, LevelId, StudentId};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::repository::{CompletionRepository, LevelRepository, StorageError};

pub const STORE_URL_ENV: &str = "PATHWAY_STORE_URL";
pub const STORE_KEY_ENV: &str = "PATHWAY_STORE_KEY";

const LEVELS_TABLE: &str = "pathway_levels";
const COMPLETIONS_TABLE: &str = "pathway_level_completions";
const DEFAULT_LEVEL_POINTS: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteConfigError {
    #[error("invalid store url {raw}: {reason}")]
    InvalidUrl { raw: String, reason: String },
    #[error("store url is set but PATHWAY_STORE_KEY is missing")]
    MissingKey,
}

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    base_url: Url,
    api_key: String,
}

impl RemoteConfig {
    /// # Errors
    ///
    /// Returns `RemoteConfigError::InvalidUrl` if `base_url` does not parse
    /// and `MissingKey` for a blank key.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, RemoteConfigError> {
        let mut url = Url::parse(base_url.trim()).map_err(|err| RemoteConfigError::InvalidUrl {
            raw: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RemoteConfigError::MissingKey);
        }

        Ok(Self {
            base_url: url,
            api_key,
        })
    }

    /// Read `PATHWAY_STORE_URL` / `PATHWAY_STORE_KEY`.
    ///
    /// Returns `Ok(None)` when no store url is configured.
    ///
    /// # Errors
    ///
    /// Returns `RemoteConfigError` when the url is set but unusable.
    pub fn from_env() -> Result<Option<Self>, RemoteConfigError> {
        let Some(base_url) = env::var(STORE_URL_ENV).ok().filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };
        let api_key = env::var(STORE_KEY_ENV).unwrap_or_default();
        Self::new(&base_url, api_key).map(Some)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> Result<Url, StorageError> {
        self.base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|err| StorageError::Connection(err.to_string()))
    }

    pub(crate) fn levels_url(&self) -> Result<Url, StorageError> {
        let mut url = self.table_url(LEVELS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "level_number.asc");
        Ok(url)
    }

    pub(crate) fn level_url(&self, id: LevelId) -> Result<Url, StorageError> {
        let mut url = self.table_url(LEVELS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("level_number", &format!("eq.{id}"));
        Ok(url)
    }

    pub(crate) fn completions_url(&self, student: &StudentId) -> Result<Url, StorageError> {
        let mut url = self.table_url(COMPLETIONS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "level_number,points")
            .append_pair("student_id", &format!("eq.{student}"));
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LevelRow {
    level_number: u32,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    week: Option<u32>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    is_locked: Option<serde_json::Value>,
}

impl LevelRow {
    /// Missing week falls back to the level number and missing points to the
    /// default value. Only a literal `true` locks the level.
    pub(crate) fn into_level(self) -> Result<LevelDefinition, StorageError> {
        LevelDefinition::new(
            LevelId::new(self.level_number),
            self.title,
            self.description.unwrap_or_default(),
            self.week.unwrap_or(self.level_number),
            self.points.unwrap_or(DEFAULT_LEVEL_POINTS),
            self.is_locked == Some(serde_json::Value::Bool(true)),
        )
        .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

/// Rows that do not form a valid level are logged and left out, so one bad
/// row never hides the rest of the pathway.
pub(crate) fn levels_from_rows(rows: Vec<LevelRow>) -> Vec<LevelDefinition> {
    rows.into_iter()
        .filter_map(|row| {
            let level_number = row.level_number;
            match row.into_level() {
                Ok(level) => Some(level),
                Err(err) => {
                    tracing::warn!(level_number, error = %err, "skipping invalid level row");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionRow {
    level_number: u32,
    #[serde(default)]
    points: Option<u32>,
}

impl CompletionRow {
    pub(crate) fn into_record(self) -> CompletionRecord {
        CompletionRecord::new(LevelId::new(self.level_number), self.points.unwrap_or(0))
    }
}

#[derive(Clone)]
pub struct RemoteStore {
    client: Client,
    config: RemoteConfig,
}

impl RemoteStore {
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, StorageError> {
        tracing::debug!(path = url.path(), "remote store query");

        let response = self
            .client
            .get(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "remote store rejected query");
            return Err(StorageError::Remote {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

#[async_trait]
impl LevelRepository for RemoteStore {
    async fn list_levels(&self) -> Result<Vec<LevelDefinition>, StorageError> {
        let rows: Vec<LevelRow> = self.fetch_rows(self.config.levels_url()?).await?;
        Ok(levels_from_rows(rows))
    }

    async fn get_level(&self, id: LevelId) -> Result<Option<LevelDefinition>, StorageError> {
        let rows: Vec<LevelRow> = self.fetch_rows(self.config.level_url(id)?).await?;
        Ok(levels_from_rows(rows).into_iter().next())
    }
}

#[async_trait]
impl CompletionRepository for RemoteStore {
    async fn list_completions(
        &self,
        student: &StudentId,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let rows: Vec<CompletionRow> = self.fetch_rows(self.config.completions_url(student)?).await?;
        Ok(rows.into_iter().map(CompletionRow::into_record).collect())
    }
}
