//! Conversion GeoJSON <-> `Campus`
//!
//! L'identité canonique d'un bâtiment est la propriété `name`. Les documents
//! qui portent encore `Name` sont normalisés une seule fois au chargement.

use std::collections::HashSet;

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use tracing::{debug, warn};

use crate::types::{BuildingFeature, Campus};
use crate::CoreError;

/// Propriété d'identité canonique
pub const NAME_KEY: &str = "name";

/// Variante historique de l'identité, acceptée en lecture seulement
pub const LEGACY_NAME_KEY: &str = "Name";

pub const HEAT_LEVEL_KEY: &str = "heatLevel";
pub const CARBON_KEY: &str = "carbon";

/// Parse un document GeoJSON FeatureCollection.
///
/// # Errors
///
/// `InvalidCampus` si le document est une Feature ou une Geometry seule.
pub fn parse_campus(json: &str) -> Result<Campus, CoreError> {
    match serde_json::from_str::<GeoJson>(json)? {
        GeoJson::FeatureCollection(collection) => from_feature_collection(collection),
        GeoJson::Feature(_) => Err(CoreError::InvalidCampus(
            "expected a FeatureCollection, found a single Feature".to_string(),
        )),
        GeoJson::Geometry(_) => Err(CoreError::InvalidCampus(
            "expected a FeatureCollection, found a bare Geometry".to_string(),
        )),
    }
}

/// Construit un `Campus` depuis une FeatureCollection.
///
/// # Errors
///
/// `MissingIdentity` si une feature n'a ni `name` ni `Name` textuel.
pub fn from_feature_collection(collection: FeatureCollection) -> Result<Campus, CoreError> {
    let mut seen = HashSet::new();
    let mut features = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.into_iter().enumerate() {
        let building = building_from_feature(index, feature)?;
        if !seen.insert(building.name.clone()) {
            warn!(building = %building.name, "Duplicate building name in campus");
        }
        features.push(building);
    }

    debug!(buildings = features.len(), "Campus loaded");

    Ok(Campus {
        features,
        bbox: collection.bbox,
        foreign_members: collection.foreign_members,
    })
}

fn building_from_feature(index: usize, feature: Feature) -> Result<BuildingFeature, CoreError> {
    let mut properties = feature.properties.unwrap_or_default();

    let name = take_identity(&mut properties).ok_or(CoreError::MissingIdentity { index })?;
    let heat_level = properties.remove(HEAT_LEVEL_KEY).and_then(|v| v.as_f64());
    let carbon = properties.remove(CARBON_KEY).and_then(|v| v.as_f64());

    Ok(BuildingFeature {
        name,
        id: feature.id,
        geometry: feature.geometry,
        heat_level,
        carbon,
        properties,
        bbox: feature.bbox,
        foreign_members: feature.foreign_members,
    })
}

/// Retire `name` (ou à défaut `Name`) des propriétés et le retourne
fn take_identity(properties: &mut JsonObject) -> Option<String> {
    let canonical = take_string(properties, NAME_KEY);
    let legacy = take_string(properties, LEGACY_NAME_KEY);
    canonical.or(legacy)
}

fn take_string(properties: &mut JsonObject, key: &str) -> Option<String> {
    match properties.remove(key) {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Reconstruit une FeatureCollection pour le composant de rendu
pub fn to_feature_collection(campus: &Campus) -> FeatureCollection {
    let features = campus.features.iter().map(building_to_feature).collect();

    FeatureCollection {
        bbox: campus.bbox.clone(),
        features,
        foreign_members: campus.foreign_members.clone(),
    }
}

fn building_to_feature(building: &BuildingFeature) -> Feature {
    let mut properties = building.properties.clone();
    properties.insert(NAME_KEY.to_string(), JsonValue::from(building.name.clone()));
    if let Some(heat_level) = building.heat_level {
        properties.insert(HEAT_LEVEL_KEY.to_string(), JsonValue::from(heat_level));
    }
    if let Some(carbon) = building.carbon {
        properties.insert(CARBON_KEY.to_string(), JsonValue::from(carbon));
    }

    Feature {
        bbox: building.bbox.clone(),
        geometry: building.geometry.clone(),
        id: building.id.clone(),
        properties: Some(properties),
        foreign_members: building.foreign_members.clone(),
    }
}
