//! Address lookup backends.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Public Nominatim instance.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

/// Coordinates as text, exactly as the service returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

/// Anything that can turn an address query into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service found nothing.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>>;
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Nominatim `/search` client.
pub struct NominatimClient {
    client: Client,
    endpoint: String,
}

impl NominatimClient {
    pub fn new(endpoint: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&q={}",
            self.endpoint,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = self.search_url(query);
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .context("Geocoding request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Geocoding service returned HTTP {}", status);
        }

        let places: Vec<Place> = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        Ok(places.into_iter().next().map(|place| {
            debug!(
                lat = %place.lat,
                lon = %place.lon,
                name = place.display_name.as_deref().unwrap_or(""),
                "Found coordinates"
            );
            Coordinates {
                lat: place.lat,
                lon: place.lon,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let client = NominatimClient::new("https://geo.example.com/", "test/1.0").unwrap();
        assert_eq!(
            client.search_url("Hays, KS, USA"),
            "https://geo.example.com/search?format=json&q=Hays%2C%20KS%2C%20USA"
        );
    }

    #[test]
    fn test_place_response_shape() {
        let body = r#"[{"place_id": 1, "lat": "38.8791", "lon": "-99.3268", "display_name": "Hays"}]"#;
        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        assert_eq!(places[0].lat, "38.8791");
        assert_eq!(places[0].lon, "-99.3268");
    }
}
