//! Implémentation du trait ImagesExt pour le serveur signserver
//!
//! Ce module enrichit `signserver::Server` avec le magasin d'images :
//! ouverture du répertoire configuré et montage du service de fichiers.
//! `signimages` étend le serveur sans que `signserver` la connaisse, selon le
//! pattern d'extension utilisé par les autres crates du workspace.
//!
//! Les routes de gestion (`/manager/...`) ne sont pas montées ici : elles sont
//! mergées avec celles de la flotte par `signdevices` pour partager un unique
//! point de montage `/manager`.

use crate::{api, ImageStore, ImagesConfigExt};
use anyhow::Result;
use signconfig::get_config;
use signserver::Server;
use std::sync::Arc;
use tracing::info;

/// Trait d'extension pour ajouter le magasin d'images à signserver
pub trait ImagesExt {
    /// Ouvre le magasin d'images configuré et enregistre la route de service
    ///
    /// # Routes enregistrées
    ///
    /// - `GET /images/{filename}` - Contenu d'une image publiée
    ///
    /// # Returns
    ///
    /// Le magasin partagé, à passer à l'initialisation de la flotte.
    async fn init_images(&mut self) -> Result<Arc<ImageStore>>;
}

impl ImagesExt for Server {
    async fn init_images(&mut self) -> Result<Arc<ImageStore>> {
        let config = get_config();
        let dir = config.get_image_dir()?;
        info!("Image store directory: {}", dir);

        let store = Arc::new(ImageStore::new(&dir)?);

        self.add_router("/images", api::files_router(store.clone()))
            .await;

        Ok(store)
    }
}
