//! Sources des prévisions: API distante avec repli sur la génération synthétique
//!
//! Le cœur (`carbon-core`) ne fait aucune I/O. C'est ici que l'échec de l'API
//! est journalisé et remplacé par une série synthétique de même forme.

use anyhow::Result;
use chrono::NaiveDate;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use carbon_core::aggregate::HOURLY_POINTS;
use carbon_core::synth::{generate_forecast, generate_history, seeded_rng, synthesize_table};
use carbon_core::{Campus, ForecastPoint, ForecastTable, HistoricalPoint};

use crate::config::Config;
use crate::remote::EmissionsClient;

/// Origine des données utilisées
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// API de prévision
    Remote,
    /// Fichier fourni par l'utilisateur
    File,
    /// Génération synthétique
    Synthetic,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::File => write!(f, "file"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Valeur accompagnée de son origine et de l'éventuel avertissement de repli
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    pub value: T,
    pub kind: SourceKind,
    pub warning: Option<String>,
}

impl<T> Sourced<T> {
    pub fn new(value: T, kind: SourceKind) -> Self {
        Self {
            value,
            kind,
            warning: None,
        }
    }

    fn fallback(value: T, warning: String) -> Self {
        Self {
            value,
            kind: SourceKind::Synthetic,
            warning: Some(warning),
        }
    }
}

/// Heure de la journée visée par un décalage depuis l'heure courante
pub fn target_hour(current_hour: u32, offset: u32) -> u32 {
    (current_hour + offset) % 24
}

/// Source de prévisions
pub struct ForecastSource {
    client: Option<EmissionsClient>,
    rng: ChaCha8Rng,
}

impl ForecastSource {
    /// Source configurée: API sauf en mode hors ligne
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = if config.offline {
            None
        } else {
            Some(EmissionsClient::new(
                &config.api_base_url,
                config.request_timeout(),
            )?)
        };
        Ok(Self {
            client,
            rng: seeded_rng(config.seed),
        })
    }

    /// Source purement synthétique
    pub fn offline(seed: Option<u64>) -> Self {
        Self {
            client: None,
            rng: seeded_rng(seed),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    /// Table de prévision pour un décalage donné
    pub async fn table_for_hour(
        &mut self,
        campus: &Campus,
        current_hour: u32,
        offset: u32,
    ) -> Sourced<ForecastTable> {
        let Some(client) = &self.client else {
            return Sourced::new(
                synthesize_table(campus, current_hour, &mut self.rng),
                SourceKind::Synthetic,
            );
        };

        let hour = target_hour(current_hour, offset);
        match client.fetch_emissions(hour).await {
            Ok(resp) => {
                info!(hour, buildings = resp.results.len(), "Fetched remote emissions");
                Sourced::new(
                    ForecastTable::from_flat(&resp.results, offset),
                    SourceKind::Remote,
                )
            }
            Err(e) => {
                warn!(hour, error = %e, "Emissions API unavailable, using synthetic data");
                Sourced::fallback(
                    synthesize_table(campus, current_hour, &mut self.rng),
                    format!("emissions for hour {}: {:#}", hour, e),
                )
            }
        }
    }

    /// Table complète (décalages 0 à 23), une requête par heure
    pub async fn full_table(&mut self, campus: &Campus, current_hour: u32) -> Sourced<ForecastTable> {
        let Some(client) = &self.client else {
            return Sourced::new(
                synthesize_table(campus, current_hour, &mut self.rng),
                SourceKind::Synthetic,
            );
        };

        let mut tasks = JoinSet::new();
        for offset in 0..HOURLY_POINTS {
            let client = client.clone();
            tasks.spawn(async move {
                let resp = client.fetch_emissions(target_hour(current_hour, offset)).await;
                (offset, resp)
            });
        }

        let mut table = ForecastTable::new();
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((offset, Ok(resp))) => {
                    table.extend(ForecastTable::from_flat(&resp.results, offset));
                }
                Ok((offset, Err(e))) => {
                    failure.get_or_insert_with(|| format!("emissions for offset {}: {:#}", offset, e));
                }
                Err(e) => {
                    failure.get_or_insert_with(|| format!("fetch task failed: {}", e));
                }
            }
        }

        match failure {
            None => {
                info!(buildings = table.len(), "Fetched remote 24h forecast");
                Sourced::new(table, SourceKind::Remote)
            }
            Some(warning) => {
                warn!(error = %warning, "Forecast API unavailable, using synthetic data");
                Sourced::fallback(
                    synthesize_table(campus, current_hour, &mut self.rng),
                    warning,
                )
            }
        }
    }

    /// Historique journalier sur `days` jours se terminant à `today`
    pub async fn history(&mut self, days: u32, today: NaiveDate) -> Sourced<Vec<HistoricalPoint>> {
        let Some(client) = &self.client else {
            return Sourced::new(
                generate_history(days, today, &mut self.rng),
                SourceKind::Synthetic,
            );
        };

        match client.fetch_history(days).await {
            Ok(points) => {
                info!(days, points = points.len(), "Fetched remote history");
                Sourced::new(points, SourceKind::Remote)
            }
            Err(e) => {
                warn!(days, error = %e, "History API unavailable, using synthetic data");
                Sourced::fallback(
                    generate_history(days, today, &mut self.rng),
                    format!("history for {} days: {:#}", days, e),
                )
            }
        }
    }

    /// Courbe synthétique de 25 points depuis l'heure courante
    pub fn synthetic_forecast(&mut self, current_hour: u32) -> Vec<ForecastPoint> {
        generate_forecast(current_hour, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbon_core::BuildingFeature;
    use proptest::prelude::*;

    fn campus() -> Campus {
        Campus::new(vec![
            BuildingFeature::new("Library"),
            BuildingFeature::new("Canteen"),
        ])
    }

    #[test]
    fn test_target_hour_wraps() {
        assert_eq!(target_hour(22, 0), 22);
        assert_eq!(target_hour(22, 3), 1);
        assert_eq!(target_hour(0, 24), 0);
    }

    #[tokio::test]
    async fn test_offline_table_is_synthetic() {
        let mut source = ForecastSource::offline(Some(5));
        assert!(source.is_offline());

        let sourced = source.table_for_hour(&campus(), 10, 4).await;
        assert_eq!(sourced.kind, SourceKind::Synthetic);
        assert!(sourced.warning.is_none());
        assert!(sourced.value.point("Library", 4).is_some());
    }

    #[tokio::test]
    async fn test_offline_table_depends_on_current_hour() {
        let night = ForecastSource::offline(Some(1))
            .table_for_hour(&campus(), 2, 0)
            .await;
        let afternoon = ForecastSource::offline(Some(1))
            .table_for_hour(&campus(), 14, 0)
            .await;

        assert_ne!(
            night.value.point("Library", 0),
            afternoon.value.point("Library", 0)
        );
    }

    #[tokio::test]
    async fn test_offline_history_is_reproducible() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let a = ForecastSource::offline(Some(9)).history(7, today).await;
        let b = ForecastSource::offline(Some(9)).history(7, today).await;
        assert_eq!(a.kind, SourceKind::Synthetic);
        assert_eq!(a.value, b.value);
        assert_eq!(a.value.len(), 7);
    }

    #[tokio::test]
    async fn test_unreachable_api_falls_back() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 1,
            ..Config::default()
        };
        let mut source = ForecastSource::from_config(&config).unwrap();

        let sourced = source.table_for_hour(&campus(), 8, 0).await;
        assert_eq!(sourced.kind, SourceKind::Synthetic);
        assert!(sourced.warning.is_some());
        assert_eq!(sourced.value.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_target_hour_is_hour_of_day(current in 0u32..24, offset in 0u32..=24) {
            let hour = target_hour(current, offset);
            prop_assert!(hour < 24);
            prop_assert_eq!((hour + 24 - current % 24) % 24, offset % 24);
        }
    }
}
