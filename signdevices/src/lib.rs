//! # signdevices - Cœur du contrôleur de flotte SignFleet
//!
//! Cette crate implémente le cycle de vie des écrans et la distribution des
//! tâches d'affichage :
//! - Registre des écrans (heartbeat, renommage, suppression, ordre d'affichage)
//! - Détection de vivacité (online / offline / élagage automatique)
//! - Distribution de tâches : push ponctuel à livraison unique par écran
//! - Diaporamas récurrents dont l'image courante est dérivée de l'horloge
//! - Persistance best-effort du registre dans un snapshot JSON
//!
//! # Architecture
//!
//! - [`Fleet`] : façade unique, toutes les opérations sous un même verrou
//! - [`DeviceRecord`] : état d'un écran (dernier heartbeat, tâche courante, nom)
//! - [`tasks`] : tâches ponctuelles ([`PendingPush`]) et récurrentes ([`Slideshow`])
//! - [`liveness`] : classification online/offline/élagage
//! - [`SnapshotStore`] : passerelle de persistance (jamais bloquante pour les requêtes)
//! - [`api`] : handlers Axum du point d'entrée HTTP
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use chrono::Utc;
//! use signdevices::{Fleet, SnapshotStore};
//! use signdevices::liveness::LivenessThresholds;
//! use signimages::ImageStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let images = Arc::new(ImageStore::new("images")?);
//! let snapshot = SnapshotStore::new("devices.json");
//! let fleet = Fleet::open(
//!     snapshot,
//!     images,
//!     "/images/default.jpg".to_string(),
//!     LivenessThresholds::default(),
//! )
//! .await;
//!
//! // Un écran s'enregistre puis interroge sa tâche
//! fleet.heartbeat("tv-hall", Utc::now()).await;
//! let outcome = fleet.poll("tv-hall", Utc::now()).await?;
//! assert!(!outcome.task_available);
//! # Ok(())
//! # }
//! ```

mod config_ext;
mod device;
mod error;
mod fleet;
mod snapshot;

pub mod api;
pub mod liveness;
pub mod tasks;

#[cfg(feature = "server")]
mod openapi;
#[cfg(feature = "server")]
mod server_ext;

pub use config_ext::FleetConfigExt;
pub use device::{DeviceRecord, DeviceStatus};
pub use error::{Error, Result};
pub use fleet::{Fleet, PollOutcome, SlideshowStarted};
pub use snapshot::SnapshotStore;
pub use tasks::{PendingPush, Slideshow};

pub use api::FleetState;

#[cfg(feature = "server")]
pub use openapi::ApiDoc;
#[cfg(feature = "server")]
pub use server_ext::FleetExt;
