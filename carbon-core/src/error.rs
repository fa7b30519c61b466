//! Types d'erreurs pour le crate carbon-core

use thiserror::Error;

/// Erreurs pouvant survenir lors du décodage des documents en entrée.
///
/// Les moteurs de fusion, d'agrégation et de classification sont totaux:
/// seules les frontières (GeoJSON du campus, payloads de prévision) échouent.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON illisible
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document GeoJSON invalide pour un campus
    #[error("Invalid campus document: {0}")]
    InvalidCampus(String),

    /// Feature sans propriété `name` ni `Name`
    #[error("Feature #{index} has no building identity (name)")]
    MissingIdentity { index: usize },

    /// Payload de prévision dans une forme inconnue
    #[error("Invalid forecast payload: {0}")]
    InvalidPayload(String),

    /// Horodatage non reconnu dans une sortie de modèle
    #[error("Invalid timestamp for {building}: {value}")]
    InvalidTimestamp { building: String, value: String },
}

impl CoreError {
    /// Crée une erreur de payload avec contexte
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload(reason.into())
    }

    /// Crée une erreur d'horodatage avec contexte
    pub fn invalid_timestamp(building: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            building: building.into(),
            value: value.into(),
        }
    }
}
