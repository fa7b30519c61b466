//! # campus-pulse
//!
//! Instantanés carbone d'un campus: prévisions de l'API fusionnées dans la
//! carte GeoJSON, avec repli sur une génération synthétique.
//!
//! ## Usage CLI
//!
//! ```bash
//! # Instantané dans 3 heures, écrit en GeoJSON
//! campus-pulse snapshot --campus ./campus.geojson --hour 3 --output ./snapshot.geojson
//!
//! # Courbe des 24 prochaines heures depuis un fichier de prévision
//! campus-pulse forecast --forecast ./forecast.json
//!
//! # Historique sur 30 jours, hors ligne et reproductible
//! campus-pulse --offline --seed 42 history --days 30
//! ```

pub mod config;
pub mod export;
pub mod remote;
pub mod report;
pub mod session;
pub mod source;

pub use config::Config;
pub use remote::EmissionsClient;
pub use report::PulseReport;
pub use session::{RequestTicket, Snapshot, SnapshotSession};
pub use source::{ForecastSource, SourceKind, Sourced};
