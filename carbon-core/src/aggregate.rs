//! Agrégation à l'échelle du campus
//!
//! - total carbone d'un instantané
//! - courbe horaire du campus depuis une table de prévision
//! - tendance par rapport à la moyenne historique
//! - résumé statistique d'une prévision

use std::collections::BTreeMap;

use serde::Serialize;

use crate::payload::round_to;
use crate::types::{Campus, ForecastPoint, ForecastTable, HistoricalPoint};

/// Nombre de points de la courbe horaire agrégée (décalages 0 à 23)
pub const HOURLY_POINTS: u32 = 24;

/// Nombre de bâtiments retenus dans le classement du résumé
pub const TOP_BUILDINGS: usize = 3;

/// Somme du carbone de tous les bâtiments (un carbone absent compte pour 0)
pub fn total_carbon(campus: &Campus) -> f64 {
    campus.features.iter().map(|f| f.carbon_or_zero()).sum()
}

/// Courbe horaire du campus: somme des émissions de tous les bâtiments par décalage.
///
/// Les décalages hors de [0, 23] sont ignorés, un décalage sans donnée vaut 0.
pub fn aggregate_forecast_to_hourly(forecast: &ForecastTable) -> Vec<ForecastPoint> {
    let mut totals = [0.0f64; HOURLY_POINTS as usize];

    for (_, points) in forecast.iter() {
        for point in points {
            if let Some(total) = totals.get_mut(point.hour_offset as usize) {
                *total += point.carbon_emission;
            }
        }
    }

    totals
        .iter()
        .enumerate()
        .map(|(offset, total)| ForecastPoint::new(offset as u32, total.round()))
        .collect()
}

/// Moyenne du carbone d'une série historique, 0 si vide
pub fn historical_average(series: &[HistoricalPoint]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().map(|p| p.carbon).sum::<f64>() / series.len() as f64
}

/// Écart en pourcentage entre `current` et la moyenne historique.
///
/// Une moyenne nulle (ou une série vide) donne 0.
pub fn trend_vs_average(current: f64, series: &[HistoricalPoint]) -> f64 {
    let average = historical_average(series);
    if average == 0.0 {
        return 0.0;
    }
    (current - average) / average * 100.0
}

/// Total d'un bâtiment sur tout l'horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingTotal {
    pub name: String,
    pub total: f64,
}

/// Résumé statistique d'une table de prévision
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmissionSummary {
    /// Somme de toutes les émissions prévues
    pub total_emission: f64,
    /// Émission moyenne par point horaire
    pub average_emission: f64,
    /// Décalage où l'émission cumulée du campus est maximale
    pub peak_hour: Option<u32>,
    pub peak_emission: f64,
    /// Bâtiments les plus émetteurs, par total décroissant
    pub top_buildings: Vec<BuildingTotal>,
    pub building_count: usize,
}

/// Calcule le résumé d'une table de prévision
pub fn summarize(forecast: &ForecastTable) -> EmissionSummary {
    let mut by_hour: BTreeMap<u32, f64> = BTreeMap::new();
    let mut buildings = Vec::with_capacity(forecast.len());
    let mut total = 0.0;
    let mut count = 0usize;

    for (name, points) in forecast.iter() {
        let building_total: f64 = points.iter().map(|p| p.carbon_emission).sum();
        for point in points {
            *by_hour.entry(point.hour_offset).or_default() += point.carbon_emission;
        }
        total += building_total;
        count += points.len();
        buildings.push(BuildingTotal {
            name: name.to_string(),
            total: round_to(building_total, 2),
        });
    }

    // Premier décalage en cas d'égalité
    let peak = by_hour
        .iter()
        .fold(None::<(u32, f64)>, |best, (&hour, &value)| match best {
            Some((_, top)) if top >= value => best,
            _ => Some((hour, value)),
        });

    buildings.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    buildings.truncate(TOP_BUILDINGS);

    EmissionSummary {
        total_emission: round_to(total, 2),
        average_emission: if count > 0 {
            round_to(total / count as f64, 2)
        } else {
            0.0
        },
        peak_hour: peak.map(|(hour, _)| hour),
        peak_emission: peak.map_or(0.0, |(_, value)| round_to(value, 2)),
        top_buildings: buildings,
        building_count: forecast.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuildingFeature, HourlyPoint};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn point(hour_offset: u32, carbon_emission: f64) -> HourlyPoint {
        HourlyPoint {
            hour_offset,
            carbon_emission,
            heat_level: 0.0,
        }
    }

    fn history(values: &[f64]) -> Vec<HistoricalPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, carbon)| HistoricalPoint::new(start + chrono::Days::new(i as u64), *carbon, 12))
            .collect()
    }

    #[test]
    fn test_total_carbon_empty() {
        assert_eq!(total_carbon(&Campus::default()), 0.0);
    }

    #[test]
    fn test_total_carbon_missing_counts_zero() {
        let campus = Campus::new(vec![
            BuildingFeature {
                carbon: Some(12.5),
                ..BuildingFeature::new("A")
            },
            BuildingFeature::new("B"),
        ]);
        assert_eq!(total_carbon(&campus), 12.5);
    }

    #[test]
    fn test_aggregate_two_buildings_same_offset() {
        let mut table = ForecastTable::new();
        table.insert("A", vec![point(5, 50.0)]);
        table.insert("B", vec![point(5, 50.0)]);

        let hourly = aggregate_forecast_to_hourly(&table);
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly[5].carbon, 100.0);
        assert_eq!(hourly[5].label, "+5h");
        assert_eq!(hourly[0].label, "Now");
        for (offset, point) in hourly.iter().enumerate() {
            assert_eq!(point.hour_offset, offset as u32);
            if offset != 5 {
                assert_eq!(point.carbon, 0.0);
            }
        }
    }

    #[test]
    fn test_aggregate_ignores_offset_24_and_rounds() {
        let mut table = ForecastTable::new();
        table.insert("A", vec![point(0, 10.4), point(24, 500.0)]);
        table.insert("B", vec![point(0, 0.3)]);

        let hourly = aggregate_forecast_to_hourly(&table);
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly[0].carbon, 11.0);
    }

    #[test]
    fn test_trend_zero_average() {
        assert_eq!(trend_vs_average(100.0, &history(&[0.0, 0.0])), 0.0);
        assert_eq!(trend_vs_average(100.0, &[]), 0.0);
    }

    #[test]
    fn test_trend_sign() {
        let series = history(&[400.0, 500.0, 600.0]);
        assert!((trend_vs_average(550.0, &series) - 10.0).abs() < 1e-9);
        assert!(trend_vs_average(450.0, &series) < 0.0);
    }

    #[test]
    fn test_summarize() {
        let mut table = ForecastTable::new();
        table.insert("Library", vec![point(0, 10.0), point(1, 30.0)]);
        table.insert("Canteen", vec![point(0, 5.0), point(1, 5.0)]);
        table.insert("Clinic", vec![point(1, 2.0)]);
        table.insert("Sports_Complex", vec![point(0, 1.0)]);

        let summary = summarize(&table);
        assert_eq!(summary.total_emission, 53.0);
        assert_eq!(summary.average_emission, 8.83);
        assert_eq!(summary.peak_hour, Some(1));
        assert_eq!(summary.peak_emission, 37.0);
        assert_eq!(summary.building_count, 4);

        let names: Vec<&str> = summary.top_buildings.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Library", "Canteen", "Clinic"]);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&ForecastTable::new());
        assert_eq!(summary, EmissionSummary::default());
    }

    proptest! {
        #[test]
        fn prop_total_carbon_is_order_independent(
            carbons in proptest::collection::vec(0u32..10_000, 0..30),
        ) {
            let features: Vec<BuildingFeature> = carbons
                .iter()
                .enumerate()
                .map(|(i, c)| BuildingFeature {
                    carbon: Some(*c as f64),
                    ..BuildingFeature::new(format!("B{}", i))
                })
                .collect();

            let mut reversed = features.clone();
            reversed.reverse();

            let forward = total_carbon(&Campus::new(features));
            let backward = total_carbon(&Campus::new(reversed));
            prop_assert_eq!(forward, backward);
            prop_assert!(forward >= 0.0);
        }
    }
}
