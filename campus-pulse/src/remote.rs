//! Client HTTP de l'API de prévision des émissions
//!
//! Endpoints consommés:
//! - `GET {base}/get-emissions/{hour}`: émissions par bâtiment pour une heure de la journée
//! - `GET {base}/get-historical-data/{days}`: moyennes journalières du campus
//!
//! Pas de retry: un échec est remonté à l'appelant qui bascule sur la
//! génération synthétique.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use carbon_core::payload::FlatEmissionsResponse;
use carbon_core::HistoricalPoint;

/// Client de l'API de prévision
#[derive(Debug, Clone)]
pub struct EmissionsClient {
    base_url: String,
    client: reqwest::Client,
}

impl EmissionsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("campus-pulse/0.1"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn emissions_url(&self, hour_of_day: u32) -> String {
        format!("{}/get-emissions/{}", self.base_url, hour_of_day)
    }

    fn history_url(&self, days: u32) -> String {
        format!("{}/get-historical-data/{}", self.base_url, days)
    }

    /// Émissions de chaque bâtiment pour une heure de la journée (0-23)
    pub async fn fetch_emissions(&self, hour_of_day: u32) -> Result<FlatEmissionsResponse> {
        let url = self.emissions_url(hour_of_day);
        debug!(url = %url, "Fetching emissions");

        let body = self.get(&url).await.context("emissions GET failed")?;
        serde_json::from_str(&body).context("emissions JSON parse failed")
    }

    /// Historique journalier du campus sur `days` jours
    pub async fn fetch_history(&self, days: u32) -> Result<Vec<HistoricalPoint>> {
        let url = self.history_url(days);
        debug!(url = %url, "Fetching history");

        let body = self.get(&url).await.context("history GET failed")?;
        let resp: RawHistory = serde_json::from_str(&body).context("history JSON parse failed")?;

        Ok(resp
            .data
            .into_iter()
            .map(|raw| HistoricalPoint {
                date: raw.date,
                carbon: raw.carbon,
                building_count: raw.buildings,
            })
            .collect())
    }

    async fn get(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            anyhow::bail!("API error: HTTP {status}: {body}");
        }
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct RawHistory {
    data: Vec<RawHistoricalPoint>,
}

#[derive(Debug, Deserialize)]
struct RawHistoricalPoint {
    date: String,
    carbon: f64,
    #[serde(default)]
    buildings: u32,
}
