//! Génération synthétique de séries d'émission
//!
//! Source de secours quand l'API de prévision est indisponible, ou pour les
//! plages historiques qu'elle ne sert pas. Ce n'est pas un modèle de prévision:
//! les courbes ont seulement une forme plausible (journalière, hebdomadaire,
//! saisonnière).
//!
//! L'aléatoire est toujours injecté (`rand::Rng`) pour que les tests puissent
//! fixer la graine.

pub mod buildings;
pub mod forecast;
pub mod history;

pub use buildings::{synthesize, synthesize_building, synthesize_table, BuildingNoise, BuildingState};
pub use forecast::generate_forecast;
pub use history::generate_history;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Générateur reproductible si une graine est fournie, sinon initialisé par l'OS
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
