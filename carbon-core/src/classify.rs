//! Classification des niveaux d'émission et formatage pour l'affichage

use serde::Serialize;

/// Seuil (kg CO2e) à partir duquel une valeur est `Mid`
pub const MID_THRESHOLD: f64 = 350.0;

/// Seuil (kg CO2e) à partir duquel une valeur est `Critical`
pub const CRITICAL_THRESHOLD: f64 = 450.0;

/// Palier de sévérité d'une émission.
///
/// L'ordre des variantes suit la sévérité croissante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Mid,
    Critical,
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Mid => write!(f, "mid"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Classe une émission en palier de sévérité.
///
/// Fonction totale: une valeur négative est `Low`.
pub fn classify(value: f64) -> SeverityTier {
    if value < MID_THRESHOLD {
        SeverityTier::Low
    } else if value < CRITICAL_THRESHOLD {
        SeverityTier::Mid
    } else {
        SeverityTier::Critical
    }
}

/// Formate une émission pour l'affichage: `1.23k` au-delà de 1000, sinon une décimale
pub fn format_magnitude(value: f64) -> String {
    if value >= 1000.0 {
        format!("{:.2}k", value / 1000.0)
    } else {
        format!("{:.1}", value)
    }
}
