//! Rapport d'exécution d'une commande
//!
//! Collecte la provenance des données, les statistiques de fusion et les
//! avertissements de repli, pour affichage console ou sauvegarde JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use carbon_core::{classify, format_magnitude, MergeStats, SeverityTier};

use crate::source::SourceKind;

/// Rapport d'une commande `snapshot`, `forecast` ou `history`
#[derive(Debug, Clone, Serialize)]
pub struct PulseReport {
    /// Nom de la commande exécutée
    pub command: String,
    /// Décalage horaire affiché (0 = maintenant)
    pub hour_offset: u32,
    /// Heure de la journée de référence
    pub current_hour: u32,
    /// Origine des données
    pub source: SourceKind,
    pub building_count: usize,
    /// Bâtiments mis à jour par la prévision
    pub matched: usize,
    /// Bâtiments transmis tels quels
    pub passthrough: usize,
    pub total_carbon: f64,
    pub tier: SeverityTier,
    /// Total formaté pour l'affichage (ex: `12.35k`)
    pub formatted: String,
    /// Écart en % par rapport à la moyenne historique
    pub trend: Option<f64>,
    pub warnings: Vec<String>,
    pub duration_secs: f64,
}

impl PulseReport {
    pub fn new(command: &str, current_hour: u32, source: SourceKind) -> Self {
        Self {
            command: command.to_string(),
            hour_offset: 0,
            current_hour,
            source,
            building_count: 0,
            matched: 0,
            passthrough: 0,
            total_carbon: 0.0,
            tier: SeverityTier::Low,
            formatted: format_magnitude(0.0),
            trend: None,
            warnings: Vec::new(),
            duration_secs: 0.0,
        }
    }

    /// Enregistre les statistiques d'une fusion
    pub fn record_merge(&mut self, stats: MergeStats) {
        self.matched = stats.matched;
        self.passthrough = stats.passthrough;
        self.building_count = stats.matched + stats.passthrough;
    }

    /// Enregistre le total carbone, sa classe et son format d'affichage
    pub fn record_total(&mut self, total_carbon: f64) {
        self.total_carbon = total_carbon;
        self.tier = classify(total_carbon);
        self.formatted = format_magnitude(total_carbon);
    }

    pub fn record_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CAMPUS PULSE - {}", self.command);
        println!("{}", "=".repeat(60));

        println!("\nSource: {}", self.source);
        println!(
            "Hour: {} (current hour {}h)",
            carbon_core::types::offset_label(self.hour_offset),
            self.current_hour
        );
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        if self.building_count > 0 {
            println!(
                "Buildings: {} ({} updated, {} unchanged)",
                self.building_count, self.matched, self.passthrough
            );
        }
        println!("Carbon: {} kg CO2e [{}]", self.formatted, self.tier);
        if let Some(trend) = self.trend {
            println!("Trend: {:+.1}% vs average", trend);
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  {}", w);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact
    pub fn summary(&self) -> String {
        format!(
            "{}: {} kg CO2e ({}), {} buildings, source {}",
            self.command, self.formatted, self.tier, self.building_count, self.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_new() {
        let report = PulseReport::new("snapshot", 14, SourceKind::Remote);
        assert_eq!(report.current_hour, 14);
        assert_eq!(report.tier, SeverityTier::Low);
        assert!(report.warnings.is_empty());
        assert!(report.trend.is_none());
    }

    #[test]
    fn test_record_merge() {
        let mut report = PulseReport::new("snapshot", 0, SourceKind::File);
        report.record_merge(MergeStats {
            matched: 3,
            passthrough: 2,
        });
        assert_eq!(report.building_count, 5);
        assert_eq!(report.matched, 3);
    }

    #[test]
    fn test_record_total() {
        let mut report = PulseReport::new("snapshot", 0, SourceKind::Synthetic);
        report.record_total(450.0);
        assert_eq!(report.tier, SeverityTier::Critical);

        report.record_total(12_346.0);
        assert_eq!(report.formatted, "12.35k");
    }

    #[test]
    fn test_summary() {
        let mut report = PulseReport::new("forecast", 9, SourceKind::Synthetic);
        report.record_total(380.0);
        report.record_warning("emissions for hour 9: connection refused");

        let summary = report.summary();
        assert!(summary.contains("forecast"));
        assert!(summary.contains("mid"));
        assert!(summary.contains("synthetic"));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_save_to_file() {
        let mut report = PulseReport::new("history", 10, SourceKind::Remote);
        report.trend = Some(-4.2);
        let path = std::env::temp_dir().join("campus_pulse_report_test.json");

        report.save_to_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""source": "remote""#));
        assert!(content.contains(r#""trend": -4.2"#));

        std::fs::remove_file(path).ok();
    }
}
