//! Tests d'intégration du client HTTP et du repli synthétique
//!
//! L'API de prévision est simulée par un serveur wiremock local.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campus_pulse::{Config, EmissionsClient, ForecastSource, SnapshotSession, SourceKind};
use carbon_core::{total_carbon, BuildingFeature, Campus};

fn campus() -> Campus {
    Campus::new(vec![
        BuildingFeature::new("Library"),
        BuildingFeature::new("Canteen"),
        BuildingFeature::new("Clinic"),
    ])
}

fn emissions_body(hour: u32) -> serde_json::Value {
    json!({
        "hour": hour,
        "results": [
            {"building_id": "Library", "total_emission": 300.0, "scaled_emission": 75.0},
            {"building_id": "Canteen", "total_emission": 100.0, "scaled_emission": 25.0}
        ]
    })
}

fn config_for(server: &MockServer) -> Config {
    Config {
        api_base_url: server.uri(),
        request_timeout_secs: 5,
        seed: Some(1),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_fetch_emissions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-emissions/14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(emissions_body(14)))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmissionsClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let resp = client.fetch_emissions(14).await.unwrap();

    assert_eq!(resp.hour, Some(14));
    assert_eq!(resp.results.len(), 2);
    assert_eq!(resp.results[0].building_id, "Library");
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-emissions/3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let client = EmissionsClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let err = client.fetch_emissions(3).await.unwrap_err();
    assert!(format!("{:#}", err).contains("HTTP 500"));
}

#[tokio::test]
async fn test_remote_snapshot_through_session() {
    let server = MockServer::start().await;
    // Heure courante 22, décalage 3 -> heure 1 de la journée
    Mock::given(method("GET"))
        .and(path("/get-emissions/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(emissions_body(1)))
        .mount(&server)
        .await;

    let mut source = ForecastSource::from_config(&config_for(&server)).unwrap();
    let session = SnapshotSession::new(campus());
    let ticket = session.select_hour(3);

    let sourced = source.table_for_hour(session.base(), 22, 3).await;
    assert_eq!(sourced.kind, SourceKind::Remote);
    assert!(sourced.warning.is_none());

    assert!(session.apply(ticket, &sourced.value));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.stats.matched, 2);
    assert_eq!(snapshot.stats.passthrough, 1);
    assert_eq!(total_carbon(&snapshot.campus), 400.0);
    assert_eq!(snapshot.campus.get("Clinic").unwrap().carbon, None);
}

#[tokio::test]
async fn test_server_error_falls_back_to_synthetic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/get-emissions/\d+$"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut source = ForecastSource::from_config(&config_for(&server)).unwrap();
    let sourced = source.table_for_hour(&campus(), 8, 2).await;

    assert_eq!(sourced.kind, SourceKind::Synthetic);
    assert!(sourced.warning.unwrap().contains("HTTP 500"));
    assert_eq!(sourced.value.len(), 3);
    assert!(sourced.value.point("Clinic", 2).is_some());
}

#[tokio::test]
async fn test_full_table_collects_every_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/get-emissions/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(emissions_body(0)))
        .expect(24)
        .mount(&server)
        .await;

    let mut source = ForecastSource::from_config(&config_for(&server)).unwrap();
    let sourced = source.full_table(&campus(), 10).await;

    assert_eq!(sourced.kind, SourceKind::Remote);
    assert_eq!(sourced.value.len(), 2);
    assert_eq!(sourced.value.get("Library").unwrap().len(), 24);
    assert_eq!(
        sourced.value.point("Canteen", 23).unwrap().carbon_emission,
        100.0
    );
}

#[tokio::test]
async fn test_history_parsing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-historical-data/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "days": 3,
            "data": [
                {"date": "Jun 13", "carbon": 400.0, "buildings": 40},
                {"date": "Jun 14", "carbon": 500.0, "buildings": 41},
                {"date": "Jun 15", "carbon": 600.0, "buildings": 39}
            ]
        })))
        .mount(&server)
        .await;

    let mut source = ForecastSource::from_config(&config_for(&server)).unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let sourced = source.history(3, today).await;

    assert_eq!(sourced.kind, SourceKind::Remote);
    assert_eq!(sourced.value.len(), 3);
    assert_eq!(sourced.value[0].date, "Jun 13");
    assert_eq!(sourced.value[2].building_count, 39);
    assert!((carbon_core::trend_vs_average(550.0, &sourced.value) - 10.0).abs() < 1e-9);
}
