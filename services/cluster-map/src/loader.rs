//! Concurrent loading of customer records and state geometry.
//!
//! Both inputs can be local paths or `http(s)://` URLs. They are fetched
//! together and the load succeeds only when both parse.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use cluster_common::RecordSet;
use renderer::BaseMapLayer;
use reqwest::Client;
use tracing::{debug, info, instrument};

/// Where an input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// Treat anything starting with `http://` or `https://` as a URL.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Everything the map needs before the first frame.
#[derive(Debug)]
pub struct MapData {
    pub records: RecordSet,
    pub basemap: BaseMapLayer,
}

/// Fetches map inputs.
pub struct Loader {
    client: Client,
}

impl Loader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Read a source as raw bytes.
    #[instrument(skip(self), fields(source = %source))]
    pub async fn fetch_bytes(&self, source: &Source) -> Result<Vec<u8>> {
        match source {
            Source::Path(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display())),
            Source::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("Request to {} failed", url))?;
                let status = response.status();
                if !status.is_success() {
                    bail!("HTTP {} fetching {}", status, url);
                }
                let body = response
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to read body of {}", url))?;
                debug!(bytes = body.len(), "Fetched");
                Ok(body.to_vec())
            }
        }
    }

    pub async fn load_records(&self, source: &Source) -> Result<RecordSet> {
        let bytes = self.fetch_bytes(source).await?;
        let records = RecordSet::from_reader(&bytes[..])
            .with_context(|| format!("Failed to parse records from {}", source))?;
        let stats = records.stats();
        info!(
            source = %source,
            total = stats.total,
            kept = stats.kept,
            dropped = stats.dropped,
            "Loaded customer records"
        );
        Ok(records)
    }

    pub async fn load_basemap(&self, source: &Source) -> Result<BaseMapLayer> {
        let bytes = self.fetch_bytes(source).await?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("Geometry in {} is not UTF-8", source))?;
        let basemap = BaseMapLayer::from_json(&text)
            .with_context(|| format!("Failed to parse geometry from {}", source))?;
        info!(source = %source, shapes = basemap.shapes().len(), "Loaded state geometry");
        Ok(basemap)
    }

    /// Load records and geometry concurrently. Fails if either fails.
    pub async fn load(&self, records: &Source, geometry: &Source) -> Result<MapData> {
        let (records, basemap) =
            tokio::try_join!(self.load_records(records), self.load_basemap(geometry))?;
        Ok(MapData { records, basemap })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.com/data.csv"),
            Source::Url("https://example.com/data.csv".to_string())
        );
        assert_eq!(
            Source::parse("data/customers.csv"),
            Source::Path(PathBuf::from("data/customers.csv"))
        );
        assert_eq!(Source::parse("ftp://x").to_string(), "ftp://x");
    }
}
