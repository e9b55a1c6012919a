use crate::analyzer::GroupAnalyzer;
use crate::error::LookupError;
use crate::models::{Config, DataSourceMode, GroupReport, StudentRecord, SBD_COLUMN};
use crate::parser::RecordParser;
use anyhow::{Context, Result};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Where the raw dataset text comes from.
pub trait DataSource {
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;

    fn describe(&self) -> String;
}

pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for LocalFileSource {
    async fn fetch(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read file: {}", self.path.display()))?;

        String::from_utf8(bytes)
            .with_context(|| format!("File is not valid UTF-8: {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }
}

impl DataSource for HttpSource {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {}", self.url))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP request failed with status: {}",
                response.status()
            ));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from: {}", self.url))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// The source selected by the configuration's data source mode.
pub enum ConfiguredSource {
    Local(LocalFileSource),
    Http(HttpSource),
}

impl ConfiguredSource {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.data_source_mode {
            DataSourceMode::Local => {
                let path = config
                    .data_file
                    .as_deref()
                    .context("data_file must be set when data_source_mode is \"local\"")?;
                Ok(Self::Local(LocalFileSource::new(path)))
            }
            DataSourceMode::Internet => {
                let url = config
                    .data_url
                    .as_deref()
                    .context("data_url must be set when data_source_mode is \"internet\"")?;
                let timeout = Duration::from_secs(config.request_timeout_secs);
                Ok(Self::Http(HttpSource::new(url, timeout)))
            }
        }
    }
}

impl DataSource for ConfiguredSource {
    async fn fetch(&self) -> Result<String> {
        match self {
            Self::Local(source) => source.fetch().await,
            Self::Http(source) => source.fetch().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Local(source) => source.describe(),
            Self::Http(source) => source.describe(),
        }
    }
}

/// Lifecycle of the session's dataset.
///
/// `Failed` and `Empty` are both retried by the next load. A load whose
/// caller gave up mid-fetch leaves `Loading` behind, which is retried too.
#[derive(Debug, Clone)]
pub enum LoadState {
    Empty,
    Loading,
    Loaded(Arc<[StudentRecord]>),
    Failed(String),
}

/// A found record together with its group report.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub record: StudentRecord,
    pub groups: GroupReport,
}

/// Holds the dataset for the lifetime of a lookup session.
///
/// The state lock is held for the whole fetch, so concurrent callers wait
/// for the first load instead of starting their own.
pub struct Session<S> {
    source: S,
    parser: RecordParser,
    analyzer: GroupAnalyzer<'static>,
    state: Mutex<LoadState>,
}

impl<S: DataSource> Session<S> {
    pub fn new(source: S) -> Self {
        Self::with_parser(source, RecordParser::new())
    }

    pub fn with_parser(source: S, parser: RecordParser) -> Self {
        Self {
            source,
            parser,
            analyzer: GroupAnalyzer::default(),
            state: Mutex::new(LoadState::Empty),
        }
    }

    pub async fn state(&self) -> LoadState {
        self.state.lock().await.clone()
    }

    /// Return the loaded records, loading them first if needed.
    pub async fn ensure_loaded(&self) -> Result<Arc<[StudentRecord]>, LookupError> {
        let mut state = self.state.lock().await;
        if let LoadState::Loaded(records) = &*state {
            return Ok(Arc::clone(records));
        }

        *state = LoadState::Loading;
        info!(source = %self.source.describe(), "loading dataset");

        let text = match self.source.fetch().await {
            Ok(text) => text,
            Err(err) => {
                let message = format!("{:#}", err);
                warn!(error = %message, "dataset load failed");
                *state = LoadState::Failed(message.clone());
                return Err(LookupError::DatasetLoad(message));
            }
        };

        let records: Arc<[StudentRecord]> = self.parser.parse(&text).into();
        if records.is_empty() {
            warn!("dataset contains no usable records");
            *state = LoadState::Empty;
            return Err(LookupError::EmptyDataset);
        }

        info!(records = records.len(), "dataset loaded");
        *state = LoadState::Loaded(Arc::clone(&records));
        Ok(records)
    }

    /// Eager load ahead of the first query; returns the record count.
    pub async fn preload(&self) -> Result<usize, LookupError> {
        self.ensure_loaded().await.map(|records| records.len())
    }

    pub async fn lookup(&self, query: &str) -> Result<Lookup, LookupError> {
        let sbd = query.trim();
        if sbd.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let records = self.ensure_loaded().await?;
        let record = find_record(&records, sbd)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(sbd.to_string()))?;
        let groups = self.analyzer.evaluate(&record);

        Ok(Lookup { record, groups })
    }
}

/// First record whose SBD equals the query, both sides trimmed. Case-sensitive.
pub fn find_record<'a>(records: &'a [StudentRecord], sbd: &str) -> Option<&'a StudentRecord> {
    let sbd = sbd.trim();
    records
        .iter()
        .find(|record| record.field(SBD_COLUMN).map(str::trim) == Some(sbd))
}
