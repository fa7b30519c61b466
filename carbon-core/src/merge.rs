//! Fusion d'une prévision horaire dans la géométrie de base du campus
//!
//! La collection de base n'est jamais modifiée: chaque fusion produit une
//! nouvelle collection de même longueur et de même ordre. Un bâtiment absent
//! de la table, ou sans point à l'heure demandée, est repris tel quel.

use tracing::debug;

use crate::payload::BuildingResult;
use crate::types::{Campus, ForecastTable};

/// Compteurs d'une fusion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Bâtiments mis à jour depuis la prévision
    pub matched: usize,
    /// Bâtiments repris sans changement
    pub passthrough: usize,
}

/// Produit l'instantané du campus pour `hour` (décalage depuis l'heure courante)
pub fn merge(base: &Campus, forecast: &ForecastTable, hour: u32) -> Campus {
    merge_with_stats(base, forecast, hour).0
}

/// Comme `merge`, avec le nombre de bâtiments mis à jour et repris
pub fn merge_with_stats(base: &Campus, forecast: &ForecastTable, hour: u32) -> (Campus, MergeStats) {
    let mut stats = MergeStats::default();

    let features = base
        .features
        .iter()
        .map(|feature| match forecast.point(&feature.name, hour) {
            Some(point) => {
                stats.matched += 1;
                feature.with_values(point.heat_level, point.carbon_emission)
            }
            None => {
                stats.passthrough += 1;
                feature.clone()
            }
        })
        .collect();

    debug!(
        hour,
        matched = stats.matched,
        passthrough = stats.passthrough,
        "Merged forecast into campus"
    );

    (base.with_features(features), stats)
}

/// Fusion depuis la réponse plate indexée par `building_id`
pub fn merge_results(base: &Campus, results: &[BuildingResult], hour: u32) -> Campus {
    let table = ForecastTable::from_flat(results, hour);
    merge(base, &table, hour)
}
