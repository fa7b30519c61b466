//! Types de données pour le crate carbon-core

use std::collections::BTreeMap;

use chrono::NaiveDate;
use geojson::feature::Id;
use geojson::{Bbox, Geometry, JsonObject};
use serde::{Deserialize, Serialize};

/// Un bâtiment du campus avec sa géométrie et ses valeurs d'affichage
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingFeature {
    /// Identité du bâtiment (unique dans une collection)
    pub name: String,

    /// Identifiant GeoJSON optionnel, transmis tel quel
    pub id: Option<Id>,

    /// Géométrie opaque (polygone, multipolygone...), jamais modifiée
    pub geometry: Option<Geometry>,

    /// Niveau de chaleur dans [0, 100]
    pub heat_level: Option<f64>,

    /// Émission carbone (kg CO2e), >= 0
    pub carbon: Option<f64>,

    /// Autres propriétés (hauteur, couleur...), transmises telles quelles
    pub properties: JsonObject,

    /// Emprise de la feature, transmise telle quelle
    pub bbox: Option<Bbox>,

    /// Membres étrangers de la feature, transmis tels quels
    pub foreign_members: Option<JsonObject>,
}

impl BuildingFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            geometry: None,
            heat_level: None,
            carbon: None,
            properties: JsonObject::new(),
            bbox: None,
            foreign_members: None,
        }
    }

    /// Copie du bâtiment avec de nouvelles valeurs chaleur/carbone.
    ///
    /// Identité, géométrie et propriétés annexes sont conservées.
    pub fn with_values(&self, heat_level: f64, carbon: f64) -> Self {
        Self {
            heat_level: Some(heat_level),
            carbon: Some(carbon),
            ..self.clone()
        }
    }

    /// Carbone du bâtiment, 0 si absent
    pub fn carbon_or_zero(&self) -> f64 {
        self.carbon.unwrap_or(0.0)
    }
}

/// Collection ordonnée des bâtiments d'un campus (GeoJSON FeatureCollection)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Campus {
    pub features: Vec<BuildingFeature>,

    /// Emprise transmise telle quelle
    pub bbox: Option<Bbox>,

    /// Membres étrangers de la FeatureCollection (`crs`, `name`...)
    pub foreign_members: Option<JsonObject>,
}

impl Campus {
    pub fn new(features: Vec<BuildingFeature>) -> Self {
        Self {
            features,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Noms des bâtiments, dans l'ordre de la collection
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Recherche un bâtiment par son nom exact
    pub fn get(&self, name: &str) -> Option<&BuildingFeature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Nouvelle collection avec les mêmes métadonnées et d'autres features
    pub(crate) fn with_features(&self, features: Vec<BuildingFeature>) -> Self {
        Self {
            features,
            bbox: self.bbox.clone(),
            foreign_members: self.foreign_members.clone(),
        }
    }
}

/// Valeur prévue pour un bâtiment à un décalage horaire donné
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// Heures après l'heure courante (0 = maintenant), dans [0, 24]
    pub hour_offset: u32,
    pub carbon_emission: f64,
    pub heat_level: f64,
}

/// Prévisions horaires par bâtiment.
///
/// Les points de chaque bâtiment sont triés par `hour_offset`, sans doublon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    buildings: BTreeMap<String, Vec<HourlyPoint>>,
}

impl ForecastTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace la série d'un bâtiment.
    ///
    /// En cas de décalages dupliqués, la première occurrence est gardée.
    pub fn insert(&mut self, building: impl Into<String>, mut points: Vec<HourlyPoint>) {
        points.sort_by_key(|p| p.hour_offset);
        points.dedup_by_key(|p| p.hour_offset);
        self.buildings.insert(building.into(), points);
    }

    /// Ajoute un point à un bâtiment, ignoré si le décalage existe déjà
    pub fn push_point(&mut self, building: &str, point: HourlyPoint) {
        let points = self.buildings.entry(building.to_string()).or_default();
        if let Err(pos) = points.binary_search_by_key(&point.hour_offset, |p| p.hour_offset) {
            points.insert(pos, point);
        }
    }

    /// Ajoute les points d'une autre table; les décalages déjà présents sont conservés
    pub fn extend(&mut self, other: ForecastTable) {
        for (building, points) in other.buildings {
            for point in points {
                self.push_point(&building, point);
            }
        }
    }

    /// Série d'un bâtiment
    pub fn get(&self, building: &str) -> Option<&[HourlyPoint]> {
        self.buildings.get(building).map(Vec::as_slice)
    }

    /// Point d'un bâtiment au décalage demandé
    pub fn point(&self, building: &str, hour_offset: u32) -> Option<&HourlyPoint> {
        let points = self.buildings.get(building)?;
        points
            .binary_search_by_key(&hour_offset, |p| p.hour_offset)
            .ok()
            .map(|idx| &points[idx])
    }

    /// Itère sur (bâtiment, série) par ordre de nom
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HourlyPoint])> {
        self.buildings
            .iter()
            .map(|(name, points)| (name.as_str(), points.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

/// Libellé d'un décalage horaire: `Now`, `+1h`, `+2h`...
pub fn offset_label(hour_offset: u32) -> String {
    if hour_offset == 0 {
        "Now".to_string()
    } else {
        format!("+{}h", hour_offset)
    }
}

/// Point de la courbe de prévision du campus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub hour_offset: u32,
    pub carbon: f64,
    pub label: String,
}

impl ForecastPoint {
    pub fn new(hour_offset: u32, carbon: f64) -> Self {
        Self {
            hour_offset,
            carbon,
            label: offset_label(hour_offset),
        }
    }
}

/// Format du libellé de date d'un point historique (ex: `Jan 5`)
pub const DATE_LABEL_FORMAT: &str = "%b %-d";

/// Émission journalière passée du campus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    /// Libellé de la date, sans année
    pub date: String,
    pub carbon: f64,
    pub building_count: u32,
}

impl HistoricalPoint {
    pub fn new(date: NaiveDate, carbon: f64, building_count: u32) -> Self {
        Self {
            date: date.format(DATE_LABEL_FORMAT).to_string(),
            carbon,
            building_count,
        }
    }
}

/// Point {x, y} transmis au composant de graphique
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

impl From<&HistoricalPoint> for ChartPoint {
    fn from(point: &HistoricalPoint) -> Self {
        Self {
            x: point.date.clone(),
            y: point.carbon,
        }
    }
}

impl From<&ForecastPoint> for ChartPoint {
    fn from(point: &ForecastPoint) -> Self {
        Self {
            x: point.label.clone(),
            y: point.carbon,
        }
    }
}
