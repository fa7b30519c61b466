//! État synthétique des bâtiments pour une heure donnée
//!
//! Les valeurs dépendent uniquement de (index du bâtiment, heure) et d'un
//! bruit borné fourni par l'appelant. Avec un bruit nul, le résultat est
//! entièrement déterministe.

use std::f64::consts::PI;

use rand::Rng;

use crate::payload::{round_to, MAX_HOUR_OFFSET};
use crate::types::{Campus, ForecastTable, HourlyPoint};

/// Amplitude du bruit sur le niveau de chaleur (+/-)
pub const HEAT_NOISE: f64 = 10.0;

/// Amplitude maximale du bruit sur le carbone
pub const CARBON_NOISE: f64 = 30.0;

/// Bruit borné appliqué à un bâtiment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingNoise {
    /// Dans [-10, 10]
    pub heat: f64,
    /// Dans [0, 30]
    pub carbon: f64,
}

impl BuildingNoise {
    pub const ZERO: Self = Self {
        heat: 0.0,
        carbon: 0.0,
    };

    /// Tire un bruit uniforme dans ses bornes
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            heat: rng.gen::<f64>() * 2.0 * HEAT_NOISE - HEAT_NOISE,
            carbon: rng.gen::<f64>() * CARBON_NOISE,
        }
    }

    fn bounded(self) -> Self {
        Self {
            heat: self.heat.clamp(-HEAT_NOISE, HEAT_NOISE),
            carbon: self.carbon.clamp(0.0, CARBON_NOISE),
        }
    }
}

/// Valeurs synthétisées pour un bâtiment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingState {
    /// Dans [0, 100], une décimale
    pub heat_level: f64,
    /// Deux décimales
    pub carbon: f64,
}

/// Facteur journalier dans [0, 1]: creux au petit matin, continu entre 23h et 0h
pub fn time_factor(hour: u32) -> f64 {
    (f64::from(hour) / 24.0 * 2.0 * PI - PI / 2.0).sin() * 0.5 + 0.5
}

/// Synthétise l'état d'un bâtiment à partir de sa position et de l'heure
pub fn synthesize_building(index: usize, hour: u32, noise: BuildingNoise) -> BuildingState {
    let noise = noise.bounded();
    let seed = (index as u64 * 17 + u64::from(hour) * 31) % 100;
    let building_base = (seed % 30) as f64 + 20.0;

    let heat_level = (building_base + time_factor(hour) * 50.0 + noise.heat).clamp(0.0, 100.0);
    let carbon = heat_level * 2.5 + noise.carbon;

    BuildingState {
        heat_level: round_to(heat_level, 1),
        carbon: round_to(carbon, 2),
    }
}

/// Instantané synthétique du campus pour `hour`.
///
/// Même longueur, même ordre et mêmes identités que `campus`.
pub fn synthesize<R: Rng + ?Sized>(campus: &Campus, hour: u32, rng: &mut R) -> Campus {
    let features = campus
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let state = synthesize_building(index, hour, BuildingNoise::sample(rng));
            feature.with_values(state.heat_level, state.carbon)
        })
        .collect();

    campus.with_features(features)
}

/// Table de prévision synthétique: 25 points (0 à 24h) par bâtiment du campus.
///
/// Le décalage `n` est synthétisé pour l'heure de la journée `current_hour + n`.
pub fn synthesize_table<R: Rng + ?Sized>(
    campus: &Campus,
    current_hour: u32,
    rng: &mut R,
) -> ForecastTable {
    let mut table = ForecastTable::new();
    for (index, feature) in campus.features.iter().enumerate() {
        let points = (0..=MAX_HOUR_OFFSET)
            .map(|offset| {
                let hour = (current_hour + offset) % 24;
                let state = synthesize_building(index, hour, BuildingNoise::sample(rng));
                HourlyPoint {
                    hour_offset: offset,
                    carbon_emission: state.carbon,
                    heat_level: state.heat_level,
                }
            })
            .collect();
        table.insert(feature.name.clone(), points);
    }
    table
}
