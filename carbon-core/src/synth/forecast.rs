//! Courbe de prévision synthétique du campus sur 24h

use rand::Rng;

use crate::types::ForecastPoint;

/// Nombre de points générés: décalages 0 à 24 inclus
pub const FORECAST_POINTS: u32 = 25;

/// Émission du campus pour une heure de la journée (profil journalier)
///
/// | heures  | forme                               |
/// |---------|-------------------------------------|
/// | [0, 6)  | plateau bas, 800 + U(0, 200)        |
/// | [6, 9)  | montée, 1000 + 200/h + U(0, 150)    |
/// | [9, 17) | pic, 1600 + U(0, 400)               |
/// | [17,21) | descente, 1400 - 100/h + U(0, 150)  |
/// | [21,24) | plateau bas, 900 + U(0, 200)        |
pub fn diurnal_emission<R: Rng + ?Sized>(hour_of_day: u32, rng: &mut R) -> f64 {
    let hour = hour_of_day % 24;
    let h = f64::from(hour);
    let u: f64 = rng.gen();

    match hour {
        0..=5 => 800.0 + u * 200.0,
        6..=8 => 1000.0 + 200.0 * (h - 6.0) + u * 150.0,
        9..=16 => 1600.0 + u * 400.0,
        17..=20 => 1400.0 - 100.0 * (h - 17.0) + u * 150.0,
        _ => 900.0 + u * 200.0,
    }
}

/// Génère les 25 points de prévision à partir de l'heure courante (0-23)
pub fn generate_forecast<R: Rng + ?Sized>(current_hour: u32, rng: &mut R) -> Vec<ForecastPoint> {
    (0..FORECAST_POINTS)
        .map(|offset| {
            let hour_of_day = (current_hour + offset) % 24;
            ForecastPoint::new(offset, diurnal_emission(hour_of_day, rng).round())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::seeded_rng;

    #[test]
    fn test_forecast_shape() {
        let forecast = generate_forecast(22, &mut seeded_rng(Some(5)));

        assert_eq!(forecast.len(), 25);
        assert_eq!(forecast[0].label, "Now");
        assert_eq!(forecast[1].label, "+1h");
        assert_eq!(forecast[24].label, "+24h");
        for (offset, point) in forecast.iter().enumerate() {
            assert_eq!(point.hour_offset, offset as u32);
        }
    }

    #[test]
    fn test_diurnal_ranges() {
        let mut rng = seeded_rng(Some(11));
        for _ in 0..50 {
            let night = diurnal_emission(3, &mut rng);
            assert!((800.0..=1000.0).contains(&night));

            let ramp = diurnal_emission(8, &mut rng);
            assert!((1400.0..=1550.0).contains(&ramp));

            let peak = diurnal_emission(12, &mut rng);
            assert!((1600.0..=2000.0).contains(&peak));

            let decline = diurnal_emission(20, &mut rng);
            assert!((1100.0..=1250.0).contains(&decline));

            let late = diurnal_emission(23, &mut rng);
            assert!((900.0..=1100.0).contains(&late));
        }
    }

    #[test]
    fn test_forecast_wraps_around_midnight() {
        let mut rng = seeded_rng(Some(2));
        let forecast = generate_forecast(23, &mut rng);
        // +1h correspond à minuit: plateau bas
        assert!(forecast[1].carbon <= 1000.0);
        // +13h correspond à midi: pic
        assert!(forecast[13].carbon >= 1600.0);
    }
}
