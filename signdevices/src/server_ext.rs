//! Extension signserver pour le contrôleur de flotte
//!
//! Ce module fournit un trait d'extension pour ajouter l'API de la flotte à
//! un serveur signserver, sans que `signserver` dépende de `signdevices`.
//!
//! # Architecture
//!
//! Le point de montage `/manager` est partagé entre les opérations de flotte
//! (cette crate) et la gestion des images (`signimages`) : les deux routers
//! sont mergés ici puis montés en une fois, Axum n'acceptant qu'un nest par
//! préfixe.

use crate::api::{self, FleetState};
use crate::config_ext::FleetConfigExt;
use crate::fleet::Fleet;
use crate::openapi::ApiDoc;
use crate::snapshot::SnapshotStore;
use anyhow::Result;
use signconfig::get_config;
use signimages::{ImageStore, ImagesConfigExt};
use signserver::Server;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

/// Trait pour étendre signserver avec le contrôleur de flotte
///
/// # Exemple
///
/// ```rust,ignore
/// use signdevices::FleetExt;
/// use signimages::ImagesExt;
/// use signserver::ServerBuilder;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut server = ServerBuilder::new_configured().build();
///
///     let images = server.init_images().await?;
///     server.init_fleet(images).await?;
///
///     server.start().await;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait FleetExt {
    /// Initialise le contrôleur de flotte et enregistre les routes HTTP
    ///
    /// # Routes enregistrées
    ///
    /// - `POST /device/heartbeat/{device_id}` - Enregistrement / rafraîchissement
    /// - `GET /device/check_task/{device_id}` - Interrogation de tâche
    /// - `GET /manager/devices` - Listing ordonné (avec élagage)
    /// - `POST /manager/push_image`, `POST /manager/push_image_bulk`
    /// - `POST /manager/set_device_name`, `DELETE /manager/delete_device/{id}`
    /// - `POST /manager/start_slideshow`, `POST /manager/stop_slideshow`
    /// - `POST /manager/update_device_order`
    /// - `POST /manager/upload_image`, `GET /manager/images`,
    ///   `DELETE /manager/delete_image/{filename}` (handlers signimages)
    ///
    /// # Returns
    ///
    /// L'état partagé de la flotte.
    async fn init_fleet(&mut self, images: Arc<ImageStore>) -> Result<FleetState>;
}

impl FleetExt for Server {
    async fn init_fleet(&mut self, images: Arc<ImageStore>) -> Result<FleetState> {
        let config = get_config();

        let thresholds = config.get_liveness_thresholds()?;
        let snapshot = SnapshotStore::new(config.get_snapshot_path()?);
        let default_task_url = images.url_for(&config.get_default_image()?);

        info!(
            snapshot = %snapshot.path().display(),
            offline_secs = thresholds.offline_secs,
            prune_secs = thresholds.prune_secs,
            "Initializing fleet controller"
        );

        let fleet = Arc::new(
            Fleet::open(snapshot, images.clone(), default_task_url, thresholds).await,
        );
        let state = FleetState::new(fleet);

        self.add_router("/device", api::device_router(state.clone()))
            .await;

        let manager = api::manager_router(state.clone())
            .merge(signimages::api::manager_router(images));
        self.add_router("/manager", manager).await;

        self.add_openapi(ApiDoc::openapi(), "fleet").await;

        Ok(state)
    }
}
