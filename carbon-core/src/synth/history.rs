//! Historique journalier synthétique

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::Rng;

use crate::types::HistoricalPoint;

/// Émission de base d'un jour ouvré
pub const WEEKDAY_BASELINE: f64 = 480.0;

/// Émission de base d'un jour de week-end
pub const WEEKEND_BASELINE: f64 = 350.0;

/// Amplitude de la variation aléatoire autour de la base (+/-)
pub const DAILY_VARIANCE: f64 = 60.0;

/// Facteur appliqué d'avril à août
pub const SUMMER_FACTOR: f64 = 1.15;

/// Nombre minimal de bâtiments reportés par jour
pub const MIN_BUILDINGS: u32 = 35;

/// Génère `days` points journaliers se terminant à `today`, du plus ancien au plus récent
pub fn generate_history<R: Rng + ?Sized>(
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<HistoricalPoint> {
    (0..days)
        .rev()
        .filter_map(|ago| today.checked_sub_days(Days::new(u64::from(ago))))
        .map(|date| {
            let baseline = if is_weekend(date) {
                WEEKEND_BASELINE
            } else {
                WEEKDAY_BASELINE
            };
            let variance = rng.gen::<f64>() * 2.0 * DAILY_VARIANCE - DAILY_VARIANCE;
            let carbon = (seasonal_factor(date) * (baseline + variance)).round();
            let building_count = rng.gen_range(0..10) + MIN_BUILDINGS;

            HistoricalPoint::new(date, carbon, building_count)
        })
        .collect()
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn seasonal_factor(date: NaiveDate) -> f64 {
    if (4..=8).contains(&date.month()) {
        SUMMER_FACTOR
    } else {
        1.0
    }
}
