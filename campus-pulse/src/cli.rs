//! Définition et implémentation des commandes CLI
//!
//! - `snapshot`: campus GeoJSON + prévision → instantané pour une heure
//! - `forecast`: courbe des 24 prochaines heures du campus
//! - `history`: série journalière passée et tendance

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;
use tracing::info;

use carbon_core::payload::MAX_HOUR_OFFSET;
use carbon_core::{
    aggregate_forecast_to_hourly, historical_average, summarize, total_carbon, trend_vs_average,
    ChartPoint, EmissionSummary, ForecastPayload, ForecastPoint, ForecastTable,
};

use campus_pulse::export::{export_snapshot, load_campus};
use campus_pulse::source::{ForecastSource, SourceKind, Sourced};
use campus_pulse::{Config, PulseReport, SnapshotSession};

#[derive(Subcommand)]
pub enum Commands {
    /// Build the campus snapshot for an hour offset
    Snapshot {
        /// Path to the campus GeoJSON FeatureCollection
        #[arg(short, long)]
        campus: PathBuf,

        /// Hours after now (0 = now, max 24)
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=24))]
        hour: u32,

        /// Forecast payload file (nested, flat or raw model output) instead of the API
        #[arg(short, long)]
        forecast: Option<PathBuf>,

        /// Write the snapshot as GeoJSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the campus forecast curve
    Forecast {
        /// Forecast payload file (nested, flat or raw model output) instead of the API
        #[arg(short, long)]
        forecast: Option<PathBuf>,

        /// Campus GeoJSON, required to query the API per building
        #[arg(short, long)]
        campus: Option<PathBuf>,
    },

    /// Print the daily history and the trend versus its average
    History {
        /// Number of days (défaut: config history_days)
        #[arg(short, long)]
        days: Option<u32>,

        /// Current emission compared to the average (défaut: last day)
        #[arg(long)]
        current: Option<f64>,
    },
}

/// Contexte commun à toutes les commandes, lu une fois au démarrage
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    /// Heure de la journée courante (0-23)
    pub current_hour: u32,
    pub today: NaiveDate,
    /// Chemin de sauvegarde du rapport JSON
    pub report_path: Option<PathBuf>,
}

impl RunContext {
    /// Début de l'heure courante, origine des décalages des sorties brutes du modèle
    fn reference_time(&self) -> Result<NaiveDateTime> {
        self.today
            .and_hms_opt(self.current_hour, 0, 0)
            .with_context(|| format!("Invalid current hour: {}", self.current_hour))
    }

    fn finish(&self, mut report: PulseReport, started: Instant) -> Result<()> {
        report.set_duration(started.elapsed());
        report.display();
        if let Some(path) = &self.report_path {
            report.save_to_file(path)?;
            info!(path = %path.display(), "Report saved");
        }
        info!("{}", report.summary());
        Ok(())
    }
}

/// Exécute la commande snapshot
pub async fn cmd_snapshot(
    ctx: &RunContext,
    campus_path: &Path,
    hour: u32,
    forecast_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    validate_hour(hour)?;
    let started = Instant::now();

    let session = SnapshotSession::new(load_campus(campus_path)?);
    let ticket = session.select_hour(hour);

    let sourced = match forecast_path {
        Some(path) => {
            let table = load_forecast(path)?.into_table(hour, ctx.reference_time()?)?;
            Sourced::new(table, SourceKind::File)
        }
        None => {
            let mut source = ForecastSource::from_config(&ctx.config)?;
            source
                .table_for_hour(session.base(), ctx.current_hour, hour)
                .await
        }
    };

    session.apply(ticket, &sourced.value);
    let snapshot = session.snapshot();

    let mut report = PulseReport::new("snapshot", ctx.current_hour, sourced.kind);
    report.hour_offset = snapshot.hour;
    report.record_merge(snapshot.stats);
    report.record_total(total_carbon(&snapshot.campus));
    if let Some(warning) = sourced.warning {
        report.record_warning(warning);
    }

    if let Some(path) = output {
        export_snapshot(&snapshot.campus, path)?;
        info!(path = %path.display(), "Snapshot written");
    }

    ctx.finish(report, started)
}

/// Exécute la commande forecast
pub async fn cmd_forecast(
    ctx: &RunContext,
    forecast_path: Option<&Path>,
    campus_path: Option<&Path>,
) -> Result<()> {
    let started = Instant::now();
    let mut source = ForecastSource::from_config(&ctx.config)?;

    let (curve, summary, kind, warning) = match (forecast_path, campus_path) {
        (Some(path), _) => {
            let table = load_forecast(path)?.into_table(0, ctx.reference_time()?)?;
            let (curve, summary) = describe(&table);
            (curve, Some(summary), SourceKind::File, None)
        }
        (None, Some(path)) => {
            let campus = load_campus(path)?;
            let sourced = source.full_table(&campus, ctx.current_hour).await;
            let (curve, summary) = describe(&sourced.value);
            (curve, Some(summary), sourced.kind, sourced.warning)
        }
        (None, None) => {
            info!("No campus given, using the synthetic campus curve");
            let curve = source.synthetic_forecast(ctx.current_hour);
            (curve, None, SourceKind::Synthetic, None)
        }
    };

    print_chart(curve.iter().map(ChartPoint::from));
    if let Some(summary) = &summary {
        print_summary(summary);
    }

    let mut report = PulseReport::new("forecast", ctx.current_hour, kind);
    report.record_total(curve.first().map_or(0.0, |p| p.carbon));
    if let Some(summary) = &summary {
        report.building_count = summary.building_count;
    }
    if let Some(warning) = warning {
        report.record_warning(warning);
    }

    ctx.finish(report, started)
}

/// Exécute la commande history
pub async fn cmd_history(ctx: &RunContext, days: Option<u32>, current: Option<f64>) -> Result<()> {
    let started = Instant::now();
    let days = days.unwrap_or(ctx.config.history_days);
    if days == 0 {
        anyhow::bail!("--days must be at least 1");
    }

    let mut source = ForecastSource::from_config(&ctx.config)?;
    let sourced = source.history(days, ctx.today).await;
    let series = &sourced.value;

    print_chart(series.iter().map(ChartPoint::from));

    let current = current
        .or_else(|| series.last().map(|p| p.carbon))
        .unwrap_or(0.0);
    let trend = trend_vs_average(current, series);
    println!(
        "\nAverage: {:.1} kg CO2e over {} days",
        historical_average(series),
        series.len()
    );

    let mut report = PulseReport::new("history", ctx.current_hour, sourced.kind);
    report.record_total(current);
    report.trend = Some(trend);
    if let Some(warning) = sourced.warning {
        report.record_warning(warning);
    }

    ctx.finish(report, started)
}

/// Charge un payload de prévision depuis un fichier
fn load_forecast(path: &Path) -> Result<ForecastPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read forecast file: {}", path.display()))?;
    ForecastPayload::from_json(&content)
        .with_context(|| format!("Invalid forecast file: {}", path.display()))
}

fn describe(table: &ForecastTable) -> (Vec<ForecastPoint>, EmissionSummary) {
    (aggregate_forecast_to_hourly(table), summarize(table))
}

fn print_chart(points: impl Iterator<Item = ChartPoint>) {
    for point in points {
        println!("  {:>8}  {:>10.1}", point.x, point.y);
    }
}

fn print_summary(summary: &EmissionSummary) {
    println!("\nTotal: {:.2} kg CO2e", summary.total_emission);
    println!("Average: {:.2} kg CO2e per point", summary.average_emission);
    if let Some(hour) = summary.peak_hour {
        println!("Peak: +{}h ({:.2} kg CO2e)", hour, summary.peak_emission);
    }
    for building in &summary.top_buildings {
        println!("  {}: {:.2}", building.name, building.total);
    }
}

/// Valide un décalage horaire (0 à 24)
fn validate_hour(hour: u32) -> Result<()> {
    if hour > MAX_HOUR_OFFSET {
        anyhow::bail!(
            "Hour offset out of range: {}. Expected 0-{}",
            hour,
            MAX_HOUR_OFFSET
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPUS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": null, "properties": {"name": "A", "carbon": 1.0}},
            {"type": "Feature", "geometry": null, "properties": {"name": "B"}},
            {"type": "Feature", "geometry": null, "properties": {"Name": "C"}}
        ]
    }"#;

    fn offline_ctx() -> RunContext {
        RunContext {
            config: Config {
                offline: true,
                seed: Some(7),
                ..Config::default()
            },
            current_hour: 14,
            today: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            report_path: None,
        }
    }

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_hour() {
        assert!(validate_hour(0).is_ok());
        assert!(validate_hour(24).is_ok());
        assert!(validate_hour(25).is_err());
    }

    #[tokio::test]
    async fn test_snapshot_from_forecast_file() {
        let campus = temp_file("campus_pulse_cli_campus.geojson", CAMPUS);
        let forecast = temp_file(
            "campus_pulse_cli_forecast.json",
            r#"{"forecasts": {
                "A": {"hourly": [{"hour_offset": 3, "carbon_emission": 100.0, "heat_level": 40.0}]},
                "B": {"hourly": [{"hour_offset": 3, "carbon_emission": 50.0, "heat_level": 20.0}]}
            }}"#,
        );
        let output = std::env::temp_dir().join("campus_pulse_cli_snapshot.geojson");

        cmd_snapshot(
            &offline_ctx(),
            &campus,
            3,
            Some(forecast.as_path()),
            Some(output.as_path()),
        )
        .await
        .unwrap();

        let snapshot = load_campus(&output).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(total_carbon(&snapshot), 150.0);
        assert_eq!(snapshot.get("C").unwrap().carbon, None);

        for path in [campus, forecast, output] {
            std::fs::remove_file(path).ok();
        }
    }

    #[tokio::test]
    async fn test_snapshot_from_model_output() {
        let campus = temp_file("campus_pulse_cli_model_campus.geojson", CAMPUS);
        // Heure courante 14h le 2025-06-15: 16h est le décalage +2
        let forecast = temp_file(
            "campus_pulse_cli_emissions.json",
            r#"{
                "A": {"2025-06-15 14:00:00": 10.0, "2025-06-15 16:00:00": 90.0},
                "C": {"2025-06-15 16:00:00": 30.0}
            }"#,
        );
        let output = std::env::temp_dir().join("campus_pulse_cli_model_snapshot.geojson");

        cmd_snapshot(
            &offline_ctx(),
            &campus,
            2,
            Some(forecast.as_path()),
            Some(output.as_path()),
        )
        .await
        .unwrap();

        let snapshot = load_campus(&output).unwrap();
        assert_eq!(total_carbon(&snapshot), 120.0);
        assert_eq!(snapshot.get("A").unwrap().heat_level, Some(100.0));
        assert_eq!(snapshot.get("B").unwrap().carbon, None);

        for path in [campus, forecast, output] {
            std::fs::remove_file(path).ok();
        }
    }

    #[tokio::test]
    async fn test_forecast_from_model_output() {
        let forecast = temp_file(
            "campus_pulse_cli_forecast_emissions.json",
            r#"{"A": {"2025-06-15 14:00:00": 40.0, "2025-06-15 15:00:00": 60.0}}"#,
        );

        cmd_forecast(&offline_ctx(), Some(forecast.as_path()), None)
            .await
            .unwrap();

        std::fs::remove_file(forecast).ok();
    }

    #[tokio::test]
    async fn test_snapshot_rejects_bad_hour() {
        let err = cmd_snapshot(&offline_ctx(), Path::new("unused.geojson"), 25, None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[tokio::test]
    async fn test_history_offline_with_report() {
        let report_path = std::env::temp_dir().join("campus_pulse_cli_report.json");
        let ctx = RunContext {
            report_path: Some(report_path.clone()),
            ..offline_ctx()
        };

        cmd_history(&ctx, Some(5), Some(400.0)).await.unwrap();

        let content = std::fs::read_to_string(&report_path).unwrap();
        assert!(content.contains(r#""command": "history""#));
        assert!(content.contains(r#""source": "synthetic""#));
        std::fs::remove_file(report_path).ok();
    }

    #[tokio::test]
    async fn test_history_rejects_zero_days() {
        assert!(cmd_history(&offline_ctx(), Some(0), None).await.is_err());
    }
}
