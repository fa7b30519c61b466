//! Session d'instantanés: la dernière heure demandée l'emporte
//!
//! Chaque changement d'heure émet un ticket croissant. Une prévision qui
//! arrive pour un ticket dépassé est ignorée, pour ne jamais revenir à une
//! heure périmée quand les réponses arrivent dans le désordre.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use carbon_core::{merge_with_stats, Campus, ForecastTable, MergeStats};

/// Ticket d'une demande d'heure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    hour: u32,
}

impl RequestTicket {
    /// Décalage horaire demandé
    pub fn hour(&self) -> u32 {
        self.hour
    }
}

/// Instantané courant et heure à laquelle il correspond
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub campus: Campus,
    pub hour: u32,
    pub stats: MergeStats,
}

/// État partagé entre la sélection d'heure et les réponses de l'API
#[derive(Debug)]
pub struct SnapshotSession {
    base: Campus,
    latest: AtomicU64,
    current: Mutex<Snapshot>,
}

impl SnapshotSession {
    /// Nouvelle session; l'instantané initial est la base, à l'heure 0
    pub fn new(base: Campus) -> Self {
        let current = Snapshot {
            campus: base.clone(),
            hour: 0,
            stats: MergeStats {
                matched: 0,
                passthrough: base.len(),
            },
        };
        Self {
            base,
            latest: AtomicU64::new(0),
            current: Mutex::new(current),
        }
    }

    /// Collection de base, jamais modifiée
    pub fn base(&self) -> &Campus {
        &self.base
    }

    /// Enregistre une nouvelle heure sélectionnée et invalide les demandes précédentes
    pub fn select_hour(&self, hour: u32) -> RequestTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(ticket = id, hour, "Hour selected");
        RequestTicket { id, hour }
    }

    /// Vrai si le ticket correspond à la dernière heure sélectionnée
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.id
    }

    /// Applique la prévision reçue pour `ticket`.
    ///
    /// Retourne `false` (et ne change rien) si une heure plus récente a été
    /// sélectionnée entre-temps.
    pub fn apply(&self, ticket: RequestTicket, forecast: &ForecastTable) -> bool {
        let mut current = self.lock();
        if !self.is_current(ticket) {
            debug!(ticket = ticket.id, hour = ticket.hour, "Discarding stale forecast");
            return false;
        }

        let (campus, stats) = merge_with_stats(&self.base, forecast, ticket.hour);
        *current = Snapshot {
            campus,
            hour: ticket.hour,
            stats,
        };
        true
    }

    /// Copie de l'instantané courant
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
