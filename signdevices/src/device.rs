//! État d'un écran enregistré auprès du contrôleur

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Statut dérivé d'un écran, recalculé à chaque listing
///
/// Ce champ n'est pas une source de vérité : seul `last_seen` l'est. Il est
/// conservé dans le record pour que la vue d'administration et le snapshot
/// reflètent la dernière classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

/// État d'un écran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceRecord {
    /// Horodatage du dernier heartbeat (secondes Unix dans le snapshot)
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = i64)]
    pub last_seen: DateTime<Utc>,

    pub status: DeviceStatus,

    /// URL de l'image que l'écran est censé afficher
    pub current_task: Option<String>,

    /// Libellé du push ou du diaporama actif
    pub current_program_name: Option<String>,

    /// Nom choisi par l'opérateur. Tant qu'il vaut l'identifiant de l'écran,
    /// l'écran est considéré comme jamais renommé et reste élagable.
    pub name: String,
}

impl DeviceRecord {
    /// Crée le record d'un écran qui vient d'envoyer son premier heartbeat
    pub fn register(device_id: &str, now: DateTime<Utc>, default_task_url: String) -> Self {
        Self {
            last_seen: now,
            status: DeviceStatus::Online,
            current_task: Some(default_task_url),
            current_program_name: None,
            name: device_id.to_string(),
        }
    }

    /// Un écran renommé n'est jamais élagué automatiquement
    pub fn is_renamed(&self, device_id: &str) -> bool {
        self.name != device_id
    }
}
