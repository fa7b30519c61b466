//! # carbon-core
//!
//! Modèle temporel des émissions carbone d'un campus.
//!
//! ## Features
//!
//! - Fusion d'une prévision horaire par bâtiment dans la géométrie du campus
//! - Agrégation (total du campus, courbe horaire, tendance, résumé)
//! - Classification en paliers de sévérité (`low`, `mid`, `critical`)
//! - Génération synthétique reproductible quand aucune source n'est disponible
//! - Normalisation des payloads de l'API (forme imbriquée ou plate)
//!
//! Aucune opération ne fait d'I/O: l'heure courante et l'aléatoire sont
//! toujours passés explicitement.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carbon_core::{classify, merge, parse_campus, total_carbon, ForecastPayload};
//!
//! let campus = parse_campus(&std::fs::read_to_string("campus.json")?)?;
//! let table = ForecastPayload::from_json(&body)?.into_table(hour, now)?;
//! let snapshot = merge(&campus, &table, hour);
//!
//! let total = total_carbon(&snapshot);
//! println!("{} kg CO2e ({})", total, classify(total));
//! ```

pub mod aggregate;
pub mod campus;
pub mod classify;
pub mod error;
pub mod merge;
pub mod payload;
pub mod synth;
pub mod types;

pub use aggregate::{
    aggregate_forecast_to_hourly, historical_average, summarize, total_carbon, trend_vs_average,
    EmissionSummary,
};
pub use campus::{parse_campus, to_feature_collection};
pub use classify::{classify, format_magnitude, SeverityTier};
pub use error::CoreError;
pub use merge::{merge, merge_results, merge_with_stats, MergeStats};
pub use payload::{BuildingResult, ForecastPayload};
pub use types::{
    BuildingFeature, Campus, ChartPoint, ForecastPoint, ForecastTable, HistoricalPoint,
    HourlyPoint,
};
