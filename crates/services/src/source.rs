//! Where the catalog and question banks come from.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use quiz_core::model::{AreaRecord, QuestionRecord};

use crate::error::SourceError;

pub const DEFAULT_AREAS_FILE: &str = "areas.json";

/// Fetches the static JSON assets of the quiz.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the area catalog.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the catalog cannot be fetched or parsed.
    async fn fetch_catalog(&self) -> Result<Vec<AreaRecord>, SourceError>;

    /// Fetch the questions stored in an area's backing file.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the file cannot be fetched or parsed.
    async fn fetch_questions(&self, file: &str) -> Result<Vec<QuestionRecord>, SourceError>;
}

fn parse<T: DeserializeOwned>(location: &str, body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|source| SourceError::Parse {
        location: location.to_owned(),
        source,
    })
}

//
// ─── HTTP ──────────────────────────────────────────────────────────────────────
//

/// Reads assets with `GET <base_url>/<file>`.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
    areas_file: String,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns `SourceError::InvalidUrl` if `base_url` does not parse.
    pub fn new(base_url: &str, areas_file: impl Into<String>) -> Result<Self, SourceError> {
        let mut base = base_url.trim().to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(&base)?,
            areas_file: areas_file.into(),
        })
    }

    async fn get_text(&self, file: &str) -> Result<(String, String), SourceError> {
        let url = self.base_url.join(file.trim_start_matches('/'))?;
        debug!(%url, "fetching");
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }
        Ok((url.to_string(), response.text().await?))
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    async fn fetch_catalog(&self) -> Result<Vec<AreaRecord>, SourceError> {
        let (url, body) = self.get_text(&self.areas_file).await?;
        parse(&url, &body)
    }

    async fn fetch_questions(&self, file: &str) -> Result<Vec<QuestionRecord>, SourceError> {
        let (url, body) = self.get_text(file).await?;
        parse(&url, &body)
    }
}

//
// ─── DIRECTORY ─────────────────────────────────────────────────────────────────
//

/// Reads assets from a local directory laid out like the static site.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    areas_file: String,
}

impl DirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, areas_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            areas_file: areas_file.into(),
        }
    }

    async fn read(&self, file: &str) -> Result<(String, String), SourceError> {
        let path = self.root.join(file.trim_start_matches('/'));
        debug!(path = %path.display(), "reading");
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;
        Ok((path.display().to_string(), body))
    }
}

#[async_trait]
impl QuestionSource for DirectorySource {
    async fn fetch_catalog(&self) -> Result<Vec<AreaRecord>, SourceError> {
        let (location, body) = self.read(&self.areas_file).await?;
        parse(&location, &body)
    }

    async fn fetch_questions(&self, file: &str) -> Result<Vec<QuestionRecord>, SourceError> {
        let (location, body) = self.read(file).await?;
        parse(&location, &body)
    }
}

//
// ─── IN MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryAssets {
    areas: Vec<AreaRecord>,
    files: HashMap<String, Vec<QuestionRecord>>,
    failing: HashSet<String>,
    catalog_failing: bool,
}

/// Source backed by values in memory, with switchable failures for tests.
#[derive(Clone, Default)]
pub struct InMemorySource {
    assets: Arc<Mutex<InMemoryAssets>>,
}

impl InMemorySource {
    #[must_use]
    pub fn new(areas: Vec<AreaRecord>) -> Self {
        Self {
            assets: Arc::new(Mutex::new(InMemoryAssets {
                areas,
                ..InMemoryAssets::default()
            })),
        }
    }

    fn with_assets<T>(&self, f: impl FnOnce(&mut InMemoryAssets) -> T) -> T {
        let mut guard = match self.assets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Install or replace the questions of a file.
    pub fn put_file(&self, file: impl Into<String>, questions: Vec<QuestionRecord>) {
        self.with_assets(|a| {
            a.files.insert(file.into(), questions);
        });
    }

    /// Make fetches of `file` fail until [`InMemorySource::heal`] is called.
    pub fn fail_file(&self, file: impl Into<String>) {
        self.with_assets(|a| {
            a.failing.insert(file.into());
        });
    }

    pub fn fail_catalog(&self) {
        self.with_assets(|a| a.catalog_failing = true);
    }

    /// Clear every injected failure.
    pub fn heal(&self) {
        self.with_assets(|a| {
            a.failing.clear();
            a.catalog_failing = false;
        });
    }
}

#[async_trait]
impl QuestionSource for InMemorySource {
    async fn fetch_catalog(&self) -> Result<Vec<AreaRecord>, SourceError> {
        self.with_assets(|a| {
            if a.catalog_failing {
                Err(SourceError::Missing(DEFAULT_AREAS_FILE.to_owned()))
            } else {
                Ok(a.areas.clone())
            }
        })
    }

    async fn fetch_questions(&self, file: &str) -> Result<Vec<QuestionRecord>, SourceError> {
        self.with_assets(|a| {
            if a.failing.contains(file) {
                return Err(SourceError::Missing(file.to_owned()));
            }
            a.files
                .get(file)
                .cloned()
                .ok_or_else(|| SourceError::Missing(file.to_owned()))
        })
    }
}
