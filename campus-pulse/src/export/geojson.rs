//! Chargement du campus et export des instantanés en GeoJSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use carbon_core::{parse_campus, to_feature_collection, Campus};

/// Charge un fichier GeoJSON FeatureCollection
pub fn load_campus(path: &Path) -> Result<Campus> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read campus file: {}", path.display()))?;
    let campus = parse_campus(&content)
        .with_context(|| format!("Invalid campus file: {}", path.display()))?;

    info!(path = %path.display(), buildings = campus.len(), "Campus loaded");
    Ok(campus)
}

/// Écrit un instantané en GeoJSON (identité sous `name`)
pub fn export_snapshot(campus: &Campus, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_snapshot(&mut writer, campus)?;
    writer.flush()?;

    debug!(path = %output_path.display(), buildings = campus.len(), "Snapshot exported");
    Ok(())
}

fn write_snapshot<W: Write>(writer: &mut W, campus: &Campus) -> Result<()> {
    let collection = to_feature_collection(campus);
    serde_json::to_writer(writer, &collection).context("Failed to serialize snapshot")?;
    Ok(())
}
