//! Formes des payloads de prévision et normalisation en `ForecastTable`
//!
//! Trois formes sont acceptées en entrée:
//! - imbriquée par nom: `{"forecasts": {"<nom>": {"hourly": [...]}}}`
//! - plate par identifiant: `{"results": [{"building_id", "total_emission", "scaled_emission"}]}`
//! - sortie brute du modèle: `{"<nom>": {"YYYY-MM-DD HH:MM:SS": kg}}`
//!
//! Toutes sont converties en une seule `ForecastTable` avant la fusion.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::{ForecastTable, HourlyPoint};
use crate::CoreError;

/// Format des horodatages de la sortie du modèle
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Horizon maximal de prévision (heures)
pub const MAX_HOUR_OFFSET: u32 = 24;

/// Réponse imbriquée par nom de bâtiment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedForecastResponse {
    pub forecasts: BTreeMap<String, BuildingForecast>,
}

/// Série horaire d'un bâtiment dans la réponse imbriquée
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingForecast {
    pub hourly: Vec<HourlyPoint>,
}

/// Réponse plate pour une heure donnée
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatEmissionsResponse {
    /// Heure de la journée demandée (0-23), informative
    #[serde(default)]
    pub hour: Option<u32>,
    pub results: Vec<BuildingResult>,
}

/// Émission d'un bâtiment dans la réponse plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingResult {
    pub building_id: String,
    pub total_emission: f64,
    /// Émission ramenée à [0, 100], utilisée comme niveau de chaleur
    pub scaled_emission: f64,
}

/// Sortie brute du modèle: bâtiment -> horodatage -> kg CO2e
pub type TimestampedForecast = BTreeMap<String, BTreeMap<String, f64>>;

/// Payload de prévision dans l'une des trois formes acceptées
#[derive(Debug, Clone)]
pub enum ForecastPayload {
    Nested(NestedForecastResponse),
    Flat(FlatEmissionsResponse),
    Timestamped(TimestampedForecast),
}

impl ForecastPayload {
    /// Décode un payload en choisissant la forme d'après ses clés
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Sans clé `forecasts` ni `results`, l'objet doit être une sortie brute
    /// du modèle: bâtiment -> horodatage -> kg CO2e.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let Some(object) = value.as_object() else {
            return Err(CoreError::invalid_payload("expected a JSON object"));
        };

        if object.contains_key("forecasts") {
            Ok(Self::Nested(serde_json::from_value(value)?))
        } else if object.contains_key("results") {
            Ok(Self::Flat(serde_json::from_value(value)?))
        } else if object.is_empty() {
            Err(CoreError::invalid_payload("empty forecast payload"))
        } else {
            serde_json::from_value(value).map(Self::Timestamped).map_err(|_| {
                CoreError::invalid_payload(
                    "expected a 'forecasts' or 'results' key, or building -> timestamp -> value maps",
                )
            })
        }
    }

    /// Normalise en table.
    ///
    /// `hour_offset` place les résultats de la forme plate; `reference` est
    /// l'heure courante à partir de laquelle les horodatages bruts sont comptés.
    ///
    /// # Errors
    ///
    /// `InvalidTimestamp` pour un horodatage illisible dans la forme brute.
    pub fn into_table(
        self,
        hour_offset: u32,
        reference: NaiveDateTime,
    ) -> Result<ForecastTable, CoreError> {
        match self {
            Self::Nested(resp) => Ok(ForecastTable::from_nested(resp)),
            Self::Flat(resp) => Ok(ForecastTable::from_flat(&resp.results, hour_offset)),
            Self::Timestamped(raw) => ForecastTable::from_timestamped(&raw, reference),
        }
    }
}

impl ForecastTable {
    /// Table depuis la réponse imbriquée
    pub fn from_nested(resp: NestedForecastResponse) -> Self {
        let mut table = Self::new();
        for (building, forecast) in resp.forecasts {
            let points = forecast.hourly.into_iter().map(sanitize).collect();
            table.insert(building, points);
        }
        debug!(buildings = table.len(), "Normalized nested forecast");
        table
    }

    /// Table depuis la réponse plate: un seul point par bâtiment, à `hour_offset`
    pub fn from_flat(results: &[BuildingResult], hour_offset: u32) -> Self {
        let mut table = Self::new();
        for result in results {
            table.push_point(
                &result.building_id,
                sanitize(HourlyPoint {
                    hour_offset,
                    carbon_emission: result.total_emission,
                    heat_level: result.scaled_emission,
                }),
            );
        }
        debug!(
            buildings = table.len(),
            hour_offset, "Normalized flat emissions"
        );
        table
    }

    /// Table depuis la sortie brute du modèle.
    ///
    /// Les décalages sont comptés depuis `reference`; les horodatages
    /// antérieurs ou au-delà de 24h sont ignorés. Le niveau de chaleur est
    /// l'émission ramenée à [0, 100] entre le min et le max de tout le payload.
    ///
    /// # Errors
    ///
    /// `InvalidTimestamp` si un horodatage ne suit pas `TIMESTAMP_FORMAT`.
    pub fn from_timestamped(
        raw: &TimestampedForecast,
        reference: NaiveDateTime,
    ) -> Result<Self, CoreError> {
        let (min, max) = raw
            .values()
            .flat_map(|series| series.values().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;

        let mut table = Self::new();
        for (building, series) in raw {
            let mut points = Vec::with_capacity(series.len());
            for (stamp, &value) in series {
                let at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
                    .map_err(|_| CoreError::invalid_timestamp(building, stamp))?;

                let minutes = (at - reference).num_minutes();
                if minutes < 0 || minutes % 60 != 0 {
                    continue;
                }
                let hour_offset = (minutes / 60) as u32;
                if hour_offset > MAX_HOUR_OFFSET {
                    continue;
                }

                let heat_level = if range > 0.0 {
                    (value - min) / range * 100.0
                } else {
                    0.0
                };
                points.push(sanitize(HourlyPoint {
                    hour_offset,
                    carbon_emission: round_to(value, 2),
                    heat_level: round_to(heat_level, 2),
                }));
            }
            table.insert(building.clone(), points);
        }

        Ok(table)
    }
}

/// Ramène un point dans son domaine: chaleur dans [0, 100], carbone >= 0
fn sanitize(point: HourlyPoint) -> HourlyPoint {
    HourlyPoint {
        hour_offset: point.hour_offset,
        carbon_emission: point.carbon_emission.max(0.0),
        heat_level: point.heat_level.clamp(0.0, 100.0),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
