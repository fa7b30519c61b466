//! Lecture et écriture des fichiers du campus

pub mod geojson;

pub use self::geojson::{export_snapshot, load_campus};
